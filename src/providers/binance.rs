use async_trait::async_trait;
use std::time::Duration;
use tracing::instrument;

use crate::core::config::BinanceProviderConfig;
use crate::core::error::{ProviderError, ProviderErrorKind};
use crate::core::indicators::MA_PERIOD;
use crate::core::model::{Asset, Domain};
use crate::core::observation::{Payload, RawObservation};
use crate::core::provider::ProviderClient;
use crate::providers::schema::{
    KlineRow, PremiumIndexWire, Ticker24hWire, TickerPriceWire, closes_from_klines,
};
use crate::providers::util::{build_client, get_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinanceEndpoint {
    /// Daily klines, enough for the moving average.
    Klines,
    TickerPrice,
    /// Perpetual futures premium index, read for `lastFundingRate`.
    FundingRate,
    Ticker24h,
}

impl BinanceEndpoint {
    fn name(&self) -> &'static str {
        match self {
            BinanceEndpoint::Klines => "binance-klines",
            BinanceEndpoint::TickerPrice => "binance-ticker-price",
            BinanceEndpoint::FundingRate => "binance-funding-rate",
            BinanceEndpoint::Ticker24h => "binance-ticker-24h",
        }
    }
}

pub struct BinanceClient {
    base_url: String,
    endpoint: BinanceEndpoint,
    quote: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl BinanceClient {
    pub fn new(
        config: &BinanceProviderConfig,
        endpoint: BinanceEndpoint,
        quote: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let base_url = match endpoint {
            BinanceEndpoint::FundingRate => &config.futures_url,
            _ => &config.spot_url,
        };
        Ok(BinanceClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoint,
            quote: quote.to_string(),
            timeout,
            client: build_client(timeout)?,
        })
    }

    fn url(&self, symbol: &str) -> String {
        match self.endpoint {
            BinanceEndpoint::Klines => format!(
                "{}/api/v3/klines?symbol={}&interval=1d&limit={}",
                self.base_url, symbol, MA_PERIOD
            ),
            BinanceEndpoint::TickerPrice => {
                format!("{}/api/v3/ticker/price?symbol={}", self.base_url, symbol)
            }
            BinanceEndpoint::FundingRate => {
                format!("{}/fapi/v1/premiumIndex?symbol={}", self.base_url, symbol)
            }
            BinanceEndpoint::Ticker24h => {
                format!("{}/api/v3/ticker/24hr?symbol={}", self.base_url, symbol)
            }
        }
    }
}

#[async_trait]
impl ProviderClient for BinanceClient {
    fn name(&self) -> &str {
        self.endpoint.name()
    }

    fn domain(&self) -> Domain {
        match self.endpoint {
            BinanceEndpoint::Ticker24h => Domain::Ticker,
            _ => Domain::Indicators,
        }
    }

    #[instrument(name = "BinanceFetch", skip(self), fields(endpoint = self.name()))]
    async fn fetch(&self, asset: Option<&Asset>) -> Result<RawObservation, ProviderError> {
        let provider = self.name();
        let asset = asset.ok_or_else(|| {
            ProviderError::new(
                provider,
                ProviderErrorKind::InvalidRequest("an asset is required".to_string()),
            )
        })?;
        let url = self.url(&asset.symbol(&self.quote));

        let payload = match self.endpoint {
            BinanceEndpoint::Klines => {
                let rows: Vec<KlineRow> = get_json(&self.client, provider, &url, self.timeout).await?;
                Payload::Closes(closes_from_klines(provider, &rows)?)
            }
            BinanceEndpoint::TickerPrice => {
                let wire: TickerPriceWire =
                    get_json(&self.client, provider, &url, self.timeout).await?;
                Payload::Price(wire.value(provider)?)
            }
            BinanceEndpoint::FundingRate => {
                let wire: PremiumIndexWire =
                    get_json(&self.client, provider, &url, self.timeout).await?;
                Payload::FundingRate(wire.rate(provider)?)
            }
            BinanceEndpoint::Ticker24h => {
                let wire: Ticker24hWire =
                    get_json(&self.client, provider, &url, self.timeout).await?;
                Payload::Ticker(wire.quote(provider)?)
            }
        };

        Ok(RawObservation::new(provider, Some(asset), payload))
    }
}

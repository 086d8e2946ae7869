use async_trait::async_trait;
use std::time::Duration;
use tracing::instrument;

use crate::core::config::SignalServiceConfig;
use crate::core::error::{ProviderError, ProviderErrorKind};
use crate::core::model::{Asset, Domain, EconomicEvent, SignalHistoryEntry};
use crate::core::observation::{Payload, RawObservation, Valuation};
use crate::core::provider::ProviderClient;
use crate::providers::schema::{
    EntitiesWire, FearGreedWire, GoogleTrendsWire, IndicatorsWire, MiningCostWire, entity_reports,
};
use crate::providers::util::{build_client, get_json};

/// Endpoints of the signal service, one client per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceEndpoint {
    Indicators,
    FearGreed,
    MiningCost,
    SearchInterest,
    Entities,
    EconomicCalendar,
    SignalHistory,
}

impl ServiceEndpoint {
    fn name(&self) -> &'static str {
        match self {
            ServiceEndpoint::Indicators => "signal-service-indicators",
            ServiceEndpoint::FearGreed => "signal-service-fear-greed",
            ServiceEndpoint::MiningCost => "signal-service-mining-cost",
            ServiceEndpoint::SearchInterest => "signal-service-google-trends",
            ServiceEndpoint::Entities => "signal-service-entities",
            ServiceEndpoint::EconomicCalendar => "signal-service-economic-indicators",
            ServiceEndpoint::SignalHistory => "signal-service-signal-history",
        }
    }

    fn needs_asset(&self) -> bool {
        !matches!(
            self,
            ServiceEndpoint::EconomicCalendar | ServiceEndpoint::SignalHistory
        )
    }
}

pub struct SignalServiceClient {
    base_url: String,
    endpoint: ServiceEndpoint,
    quote: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl SignalServiceClient {
    pub fn new(
        config: &SignalServiceConfig,
        endpoint: ServiceEndpoint,
        quote: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(SignalServiceClient {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoint,
            quote: quote.to_string(),
            timeout,
            client: build_client(timeout)?,
        })
    }

    fn url(&self, asset: Option<&Asset>) -> String {
        let id = asset.map(Asset::id).unwrap_or_default();
        let endpoint = match self.endpoint {
            ServiceEndpoint::Indicators => "/api/indicators".to_string(),
            ServiceEndpoint::FearGreed => format!("/api/fear-greed/{id}"),
            ServiceEndpoint::MiningCost => format!("/api/mining-cost/{id}"),
            ServiceEndpoint::SearchInterest => format!("/api/google-trends/{id}"),
            ServiceEndpoint::Entities => format!("/api/entities/{id}"),
            ServiceEndpoint::EconomicCalendar => "/api/economic-indicators".to_string(),
            ServiceEndpoint::SignalHistory => "/api/signal-history".to_string(),
        };
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ProviderError> {
        get_json(&self.client, self.endpoint.name(), url, self.timeout).await
    }
}

#[async_trait]
impl ProviderClient for SignalServiceClient {
    fn name(&self) -> &str {
        self.endpoint.name()
    }

    fn domain(&self) -> Domain {
        match self.endpoint {
            ServiceEndpoint::Entities => Domain::Entities,
            ServiceEndpoint::EconomicCalendar => Domain::EconomicCalendar,
            ServiceEndpoint::SignalHistory => Domain::SignalHistory,
            _ => Domain::Indicators,
        }
    }

    #[instrument(name = "SignalServiceFetch", skip(self), fields(endpoint = self.name()))]
    async fn fetch(&self, asset: Option<&Asset>) -> Result<RawObservation, ProviderError> {
        let provider = self.name();
        if self.endpoint.needs_asset() && asset.is_none() {
            return Err(ProviderError::new(
                provider,
                ProviderErrorKind::InvalidRequest("an asset is required".to_string()),
            ));
        }
        let url = self.url(asset);

        let payload = match (self.endpoint, asset) {
            (ServiceEndpoint::Indicators, Some(asset)) => {
                let wire: IndicatorsWire = self.get(&url).await?;
                Payload::SignalLabels(wire.labels_for(&asset.symbol(&self.quote), asset.id()))
            }
            (ServiceEndpoint::FearGreed, _) => {
                let wire: FearGreedWire = self.get(&url).await?;
                Payload::Valuation(Valuation::from(&wire.reading))
            }
            (ServiceEndpoint::MiningCost, _) => {
                let wire: MiningCostWire = self.get(&url).await?;
                Payload::Valuation(Valuation::from(&wire.reading))
            }
            (ServiceEndpoint::SearchInterest, _) => {
                let wire: GoogleTrendsWire = self.get(&url).await?;
                Payload::Valuation(Valuation::from(&wire.reading))
            }
            (ServiceEndpoint::Entities, _) => {
                let wire: EntitiesWire = self.get(&url).await?;
                Payload::Entities(entity_reports(&wire.entities))
            }
            (ServiceEndpoint::EconomicCalendar, _) => {
                let events: Vec<EconomicEvent> = self.get(&url).await?;
                Payload::Calendar(events)
            }
            (ServiceEndpoint::SignalHistory, _) => {
                let entries: Vec<SignalHistoryEntry> = self.get(&url).await?;
                Payload::SignalHistory(entries)
            }
            (ServiceEndpoint::Indicators, None) => {
                return Err(ProviderError::new(
                    provider,
                    ProviderErrorKind::InvalidRequest("an asset is required".to_string()),
                ));
            }
        };

        Ok(RawObservation::new(provider, asset, payload))
    }
}

//! Read-only fallback snapshot, stored as `backup_data.json`.
//!
//! The document is keyed by domain and then by asset id:
//!
//! ```json
//! {
//!   "indicators": {"BTC": {"klines": [...], "ticker_price": {"price": "..."},
//!                          "premium_index": {"lastFundingRate": "..."},
//!                          "knnMovingAverage": "Above", "Fear-Greed": {...}}},
//!   "entities": {"BTC": {"Entities": {"ETFs": {...}}}},
//!   "economic_indicators": [...],
//!   "signal_history": [...],
//!   "ticker": {"BTC": {"lastPrice": "...", "priceChangePercent": "..."}}
//! }
//! ```
//!
//! Every leaf has the wire shape of the live endpoint it replaces.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{BackupUnavailable, ProviderError};
use crate::core::indicators::IndicatorInputs;
use crate::core::model::{Asset, Domain, EconomicEvent, SignalHistoryEntry};
use crate::core::observation::{Payload, RawObservation, SignalLabels, Valuation};
use crate::providers::schema::{
    EntitiesWire, FearGreedReading, GoogleTrendsReading, KlineRow, MiningCostReading,
    PremiumIndexWire, Ticker24hWire, TickerPriceWire, closes_from_klines, entity_reports,
};

const PROVIDER: &str = "backup";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupIndicators {
    #[serde(default)]
    pub klines: Option<Vec<KlineRow>>,
    #[serde(default)]
    pub ticker_price: Option<TickerPriceWire>,
    #[serde(default)]
    pub premium_index: Option<PremiumIndexWire>,
    #[serde(flatten)]
    pub labels: SignalLabels,
    #[serde(rename = "Fear-Greed", default)]
    pub fear_greed: Option<FearGreedReading>,
    #[serde(rename = "Mining-Cost", default)]
    pub mining_cost: Option<MiningCostReading>,
    #[serde(rename = "Google-Trends", default)]
    pub google_trends: Option<GoogleTrendsReading>,
}

impl BackupIndicators {
    fn inputs(&self) -> Result<IndicatorInputs, ProviderError> {
        Ok(IndicatorInputs {
            closes: self
                .klines
                .as_deref()
                .map(|rows| closes_from_klines(PROVIDER, rows))
                .transpose()?,
            price: self
                .ticker_price
                .as_ref()
                .map(|p| p.value(PROVIDER))
                .transpose()?,
            funding_rate: self
                .premium_index
                .as_ref()
                .map(|p| p.rate(PROVIDER))
                .transpose()?,
            labels: self.labels.clone(),
            fear_greed: self.fear_greed.as_ref().map(Valuation::from),
            mining_cost: self.mining_cost.as_ref().map(Valuation::from),
            search_interest: self.google_trends.as_ref().map(Valuation::from),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupDocument {
    #[serde(default)]
    pub indicators: HashMap<Asset, BackupIndicators>,
    #[serde(default)]
    pub entities: HashMap<Asset, EntitiesWire>,
    #[serde(default)]
    pub economic_indicators: Option<Vec<EconomicEvent>>,
    #[serde(default)]
    pub signal_history: Option<Vec<SignalHistoryEntry>>,
    #[serde(default)]
    pub ticker: HashMap<Asset, Ticker24hWire>,
}

enum Location {
    File(PathBuf),
    Inline(Arc<BackupDocument>),
}

pub struct BackupSnapshotStore {
    location: Location,
}

impl BackupSnapshotStore {
    /// Store backed by a file that is re-read on every load.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        BackupSnapshotStore {
            location: Location::File(path.into()),
        }
    }

    pub fn from_document(document: BackupDocument) -> Self {
        BackupSnapshotStore {
            location: Location::Inline(Arc::new(document)),
        }
    }

    async fn document(
        &self,
        domain: Domain,
        asset: Option<&Asset>,
    ) -> Result<Arc<BackupDocument>, BackupUnavailable> {
        match &self.location {
            Location::Inline(document) => Ok(Arc::clone(document)),
            Location::File(path) => {
                debug!("Reading backup snapshot from {}", path.display());
                let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                    BackupUnavailable::new(
                        domain,
                        asset,
                        format!("cannot read {}: {e}", path.display()),
                    )
                })?;
                let document: BackupDocument = serde_json::from_str(&text).map_err(|e| {
                    BackupUnavailable::new(
                        domain,
                        asset,
                        format!("malformed {}: {e}", path.display()),
                    )
                })?;
                Ok(Arc::new(document))
            }
        }
    }

    /// Reads the snapshot entry for `(domain, asset)`.
    pub async fn load(
        &self,
        domain: Domain,
        asset: Option<&Asset>,
    ) -> Result<RawObservation, BackupUnavailable> {
        let document = self.document(domain, asset).await?;
        let unavailable = |reason: String| BackupUnavailable::new(domain, asset, reason);
        let no_entry = || unavailable("no entry".to_string());

        let payload = match domain {
            Domain::Indicators => {
                let entry = asset
                    .and_then(|a| document.indicators.get(a))
                    .ok_or_else(no_entry)?;
                Payload::IndicatorBundle(entry.inputs().map_err(|e| unavailable(e.to_string()))?)
            }
            Domain::Entities => {
                let entry = asset
                    .and_then(|a| document.entities.get(a))
                    .ok_or_else(no_entry)?;
                Payload::Entities(entity_reports(&entry.entities))
            }
            Domain::EconomicCalendar => {
                Payload::Calendar(document.economic_indicators.clone().ok_or_else(no_entry)?)
            }
            Domain::SignalHistory => {
                Payload::SignalHistory(document.signal_history.clone().ok_or_else(no_entry)?)
            }
            Domain::Ticker => {
                let entry = asset
                    .and_then(|a| document.ticker.get(a))
                    .ok_or_else(no_entry)?;
                Payload::Ticker(entry.quote(PROVIDER).map_err(|e| unavailable(e.to_string()))?)
            }
        };

        Ok(RawObservation::new(PROVIDER, asset, payload))
    }
}

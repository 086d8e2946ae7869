//! Transient provider output, consumed once by the indicator computations.

use crate::core::indicators::IndicatorInputs;
use crate::core::model::{Asset, EconomicEvent, EntityCategory, IndicatorKind, SignalHistoryEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub provider: String,
    pub asset: Option<Asset>,
    pub observed_at: DateTime<Utc>,
    pub payload: Payload,
}

impl RawObservation {
    pub fn new(provider: impl Into<String>, asset: Option<&Asset>, payload: Payload) -> Self {
        Self {
            provider: provider.into(),
            asset: asset.cloned(),
            observed_at: Utc::now(),
            payload,
        }
    }
}

/// Provider payloads after schema validation, one variant per endpoint shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Daily closes, oldest first.
    Closes(Vec<f64>),
    Price(f64),
    /// Raw funding rate as a fraction, e.g. `0.0001`.
    FundingRate(f64),
    Ticker(TickerQuote),
    SignalLabels(SignalLabels),
    Valuation(Valuation),
    Entities(Vec<EntityReport>),
    Calendar(Vec<EconomicEvent>),
    SignalHistory(Vec<SignalHistoryEntry>),
    /// Everything the indicator domain needs at once, as stored in the backup.
    IndicatorBundle(IndicatorInputs),
}

impl Payload {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Payload::Closes(_) => "closes",
            Payload::Price(_) => "price",
            Payload::FundingRate(_) => "funding-rate",
            Payload::Ticker(_) => "ticker",
            Payload::SignalLabels(_) => "signal-labels",
            Payload::Valuation(_) => "valuation",
            Payload::Entities(_) => "entities",
            Payload::Calendar(_) => "calendar",
            Payload::SignalHistory(_) => "signal-history",
            Payload::IndicatorBundle(_) => "indicator-bundle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickerQuote {
    pub last_price: f64,
    pub change_percent: f64,
}

/// Qualitative readings published by the custom indicator service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalLabels {
    #[serde(rename = "knnMovingAverage", default)]
    pub knn_moving_average: Option<String>,
    #[serde(rename = "keltnerChannels", default)]
    pub keltner_channels: Option<String>,
    #[serde(rename = "aiTrendNavigator", default)]
    pub ai_trend_navigator: Option<String>,
}

/// A threshold-band reading with its upstream classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub kind: IndicatorKind,
    pub value: f64,
    pub label: String,
}

/// One entity row as reported, before percentage parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityReport {
    pub category: EntityCategory,
    pub name: String,
    pub change: Option<String>,
    pub streak: Option<String>,
}

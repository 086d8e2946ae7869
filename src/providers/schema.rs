//! Wire schemas of the upstream endpoints.
//!
//! The backup document reuses these structs, so a backup entry always has the
//! same shape as the live response it stands in for.

use crate::core::error::ProviderError;
use crate::core::model::{EntityCategory, IndicatorKind};
use crate::core::numeric::parse_decimal;
use crate::core::observation::{EntityReport, SignalLabels, TickerQuote, Valuation};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// One kline row: `[open_time, open, high, low, close, volume, ...]`.
pub type KlineRow = Vec<serde_json::Value>;

const KLINE_CLOSE_INDEX: usize = 4;

/// Closing prices of the rows, oldest first.
pub fn closes_from_klines(provider: &str, rows: &[KlineRow]) -> Result<Vec<f64>, ProviderError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let close = row.get(KLINE_CLOSE_INDEX).and_then(|v| match v {
                serde_json::Value::String(s) => parse_decimal(s),
                serde_json::Value::Number(n) => n.as_f64(),
                _ => None,
            });
            close.ok_or_else(|| ProviderError::schema(provider, format!("kline {i} has no close price")))
        })
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickerPriceWire {
    pub price: String,
}

impl TickerPriceWire {
    pub fn value(&self, provider: &str) -> Result<f64, ProviderError> {
        parse_decimal(&self.price)
            .ok_or_else(|| ProviderError::schema(provider, format!("invalid price: {}", self.price)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PremiumIndexWire {
    #[serde(rename = "lastFundingRate")]
    pub last_funding_rate: String,
}

impl PremiumIndexWire {
    pub fn rate(&self, provider: &str) -> Result<f64, ProviderError> {
        parse_decimal(&self.last_funding_rate).ok_or_else(|| {
            ProviderError::schema(
                provider,
                format!("invalid funding rate: {}", self.last_funding_rate),
            )
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ticker24hWire {
    #[serde(rename = "lastPrice")]
    pub last_price: String,
    #[serde(rename = "priceChangePercent")]
    pub price_change_percent: String,
}

impl Ticker24hWire {
    pub fn quote(&self, provider: &str) -> Result<TickerQuote, ProviderError> {
        match (
            parse_decimal(&self.last_price),
            parse_decimal(&self.price_change_percent),
        ) {
            (Some(last_price), Some(change_percent)) => Ok(TickerQuote {
                last_price,
                change_percent,
            }),
            _ => Err(ProviderError::schema(
                provider,
                format!(
                    "invalid ticker values: {} / {}",
                    self.last_price, self.price_change_percent
                ),
            )),
        }
    }
}

/// `/api/indicators`, either wrapped in `indicator_data` or as a bare map.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IndicatorsWire {
    Wrapped {
        indicator_data: HashMap<String, SignalLabels>,
    },
    Bare(HashMap<String, SignalLabels>),
}

impl IndicatorsWire {
    /// Labels for a pair symbol (`BTCUSDT`) or plain asset id (`BTC`).
    pub fn labels_for(&self, symbol: &str, id: &str) -> SignalLabels {
        let map = match self {
            IndicatorsWire::Wrapped { indicator_data } => indicator_data,
            IndicatorsWire::Bare(map) => map,
        };
        map.get(symbol).or_else(|| map.get(id)).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FearGreedReading {
    #[serde(default)]
    pub value: Option<f64>,
    pub change: f64,
    pub valuation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FearGreedWire {
    #[serde(rename = "Fear-Greed")]
    pub reading: FearGreedReading,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MiningCostReading {
    pub ratio: f64,
    pub valuation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MiningCostWire {
    #[serde(rename = "Mining-Cost")]
    pub reading: MiningCostReading,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTrendsReading {
    pub change: f64,
    pub valuation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTrendsWire {
    #[serde(rename = "Google-Trends")]
    pub reading: GoogleTrendsReading,
}

impl From<&FearGreedReading> for Valuation {
    fn from(reading: &FearGreedReading) -> Self {
        Valuation {
            kind: IndicatorKind::FearGreedIndex,
            value: reading.change,
            label: reading.valuation.clone(),
        }
    }
}

impl From<&MiningCostReading> for Valuation {
    fn from(reading: &MiningCostReading) -> Self {
        Valuation {
            kind: IndicatorKind::MiningCostRatio,
            value: reading.ratio,
            label: reading.valuation.clone(),
        }
    }
}

impl From<&GoogleTrendsReading> for Valuation {
    fn from(reading: &GoogleTrendsReading) -> Self {
        Valuation {
            kind: IndicatorKind::SearchInterest,
            value: reading.change,
            label: reading.valuation.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HoldingWire {
    #[serde(default)]
    pub change: Option<String>,
    #[serde(default)]
    pub streak: Option<String>,
}

/// Category → entity name → holding. Null entries are tolerated. Entity names
/// keep the order the provider sent them in.
pub type EntityMapWire = BTreeMap<EntityCategory, IndexMap<String, Option<HoldingWire>>>;

#[derive(Debug, Clone, Deserialize)]
pub struct EntitiesWire {
    #[serde(rename = "Entities")]
    pub entities: EntityMapWire,
}

pub fn entity_reports(map: &EntityMapWire) -> Vec<EntityReport> {
    map.iter()
        .flat_map(|(category, entities)| {
            entities.iter().map(move |(name, holding)| {
                let holding = holding.clone().unwrap_or_default();
                EntityReport {
                    category: *category,
                    name: name.clone(),
                    change: holding.change,
                    streak: holding.streak,
                }
            })
        })
        .collect()
}

//! Canonical domain types the engine computes and publishes.

use crate::core::numeric::de_string_or_number;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A tracked asset such as `BTC`. Always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Asset(String);

impl Asset {
    pub fn new(id: &str) -> Self {
        Asset(id.trim().to_uppercase())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    /// Exchange pair for this asset, e.g. `BTCUSDT`.
    pub fn symbol(&self, quote: &str) -> String {
        format!("{}{}", self.0, quote.to_uppercase())
    }
}

impl From<String> for Asset {
    fn from(value: String) -> Self {
        Asset::new(&value)
    }
}

impl From<Asset> for String {
    fn from(value: Asset) -> Self {
        value.0
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One category of tracked data, each refreshed on its own schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    Indicators,
    Entities,
    EconomicCalendar,
    SignalHistory,
    Ticker,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Indicators,
        Domain::Entities,
        Domain::EconomicCalendar,
        Domain::SignalHistory,
        Domain::Ticker,
    ];

    /// Whether views of this domain are kept per asset or once globally.
    pub fn is_per_asset(&self) -> bool {
        matches!(self, Domain::Indicators | Domain::Entities | Domain::Ticker)
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Domain::Indicators => "indicators",
                Domain::Entities => "entities",
                Domain::EconomicCalendar => "economic-calendar",
                Domain::SignalHistory => "signal-history",
                Domain::Ticker => "ticker",
            }
        )
    }
}

impl FromStr for Domain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "indicators" => Ok(Domain::Indicators),
            "entities" => Ok(Domain::Entities),
            "economic-calendar" | "calendar" => Ok(Domain::EconomicCalendar),
            "signal-history" | "signals" => Ok(Domain::SignalHistory),
            "ticker" => Ok(Domain::Ticker),
            _ => Err(anyhow::anyhow!("Invalid domain: {}", s)),
        }
    }
}

/// Normalized trading stance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Hold,
    Buy,
    Sell,
    Unknown,
}

impl Decision {
    /// Maps an upstream qualitative label. Anything other than buy/sell is neutral.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("buy") {
            Decision::Buy
        } else if label.eq_ignore_ascii_case("sell") {
            Decision::Sell
        } else {
            Decision::Hold
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Decision::Hold => "Hold",
                Decision::Buy => "Buy",
                Decision::Sell => "Sell",
                Decision::Unknown => "Unknown",
            }
        )
    }
}

/// Where a published view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Live,
    Backup,
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Live => f.write_str("live"),
            Source::Backup => f.write_str("backup"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum IndicatorKind {
    MovingAverage128,
    FundingRate,
    KnnTrendLine,
    KeltnerChannel,
    AiTrendNavigator,
    FearGreedIndex,
    MiningCostRatio,
    SearchInterest,
}

impl IndicatorKind {
    /// Display order of the indicator table.
    pub const ALL: [IndicatorKind; 8] = [
        IndicatorKind::MovingAverage128,
        IndicatorKind::FundingRate,
        IndicatorKind::KnnTrendLine,
        IndicatorKind::KeltnerChannel,
        IndicatorKind::AiTrendNavigator,
        IndicatorKind::FearGreedIndex,
        IndicatorKind::MiningCostRatio,
        IndicatorKind::SearchInterest,
    ];

    /// Range or reading hint shown next to the value.
    pub fn reading(&self) -> &'static str {
        match self {
            IndicatorKind::MovingAverage128 | IndicatorKind::KnnTrendLine => "Above/Below",
            IndicatorKind::FundingRate => "+/-",
            IndicatorKind::KeltnerChannel => "Upper/Middle/Lower",
            IndicatorKind::AiTrendNavigator => "Green/Red",
            IndicatorKind::FearGreedIndex | IndicatorKind::SearchInterest => "0-100",
            IndicatorKind::MiningCostRatio => "0.00-2.00",
        }
    }
}

impl Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                IndicatorKind::MovingAverage128 => "128 Moving Average",
                IndicatorKind::FundingRate => "Funding Rate",
                IndicatorKind::KnnTrendLine => "Knn Classifier Line",
                IndicatorKind::KeltnerChannel => "Keltner Channels",
                IndicatorKind::AiTrendNavigator => "AI Trend Navigator",
                IndicatorKind::FearGreedIndex => "Fear & Greed Index",
                IndicatorKind::MiningCostRatio => "Mining Cost",
                IndicatorKind::SearchInterest => "Google Trends",
            }
        )
    }
}

/// A computed indicator. `decision` is always derived from `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub kind: IndicatorKind,
    pub value: String,
    pub decision: Decision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum EntityCategory {
    #[serde(rename = "ETFs")]
    Etf,
    #[serde(rename = "CEX")]
    Exchange,
    #[serde(rename = "Companies")]
    Company,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 3] = [
        EntityCategory::Exchange,
        EntityCategory::Company,
        EntityCategory::Etf,
    ];
}

impl Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                EntityCategory::Etf => "ETFs",
                EntityCategory::Exchange => "CEX",
                EntityCategory::Company => "Companies",
            }
        )
    }
}

/// A free-text `change`/`streak` field split into its display parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentField {
    pub raw: String,
    pub main_value: String,
    pub percentage: String,
    pub decision: Decision,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHolding {
    pub category: EntityCategory,
    pub name: String,
    pub change: PercentField,
    pub streak: Option<PercentField>,
}

/// A scheduled macro-economic release. Values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicEvent {
    pub date: String,
    pub time: String,
    pub event_name: String,
    #[serde(default)]
    pub actual_value: Option<String>,
    #[serde(default)]
    pub consensus_value: Option<String>,
    #[serde(default)]
    pub previous_value: Option<String>,
    #[serde(default)]
    pub forecast_value: Option<String>,
}

/// Events of one date, in the order the provider listed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: String,
    pub events: Vec<EconomicEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalHistoryEntry {
    pub timestamp: String,
    pub subtitle: String,
    #[serde(deserialize_with = "de_string_or_number")]
    pub price: String,
    pub description: String,
}

/// 24-hour price card for one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub price: String,
    pub change_percent: String,
    pub is_loss: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_is_normalized() {
        let asset = Asset::new(" btc ");
        assert_eq!(asset.id(), "BTC");
        assert_eq!(asset.symbol("usdt"), "BTCUSDT");

        let parsed: Asset = serde_json::from_str("\"eth\"").unwrap();
        assert_eq!(parsed, Asset::new("ETH"));
    }

    #[test]
    fn test_decision_from_label() {
        assert_eq!(Decision::from_label("Buy"), Decision::Buy);
        assert_eq!(Decision::from_label(" sell "), Decision::Sell);
        assert_eq!(Decision::from_label("Neutral"), Decision::Hold);
        assert_eq!(Decision::from_label(""), Decision::Hold);
    }

    #[test]
    fn test_domain_round_trip_through_display() {
        for domain in Domain::ALL {
            assert_eq!(domain.to_string().parse::<Domain>().unwrap(), domain);
        }
        assert!("prices".parse::<Domain>().is_err());
    }

    #[test]
    fn test_signal_history_accepts_numeric_price() {
        let entry: SignalHistoryEntry = serde_json::from_str(
            r#"{"timestamp": "Today, 2:00 AM", "subtitle": "128 Moving Average",
                "price": 60000, "description": "Under 128 Moving Average"}"#,
        )
        .unwrap();
        assert_eq!(entry.price, "60000");
    }

    #[test]
    fn test_entity_category_wire_names() {
        let cat: EntityCategory = serde_json::from_str("\"CEX\"").unwrap();
        assert_eq!(cat, EntityCategory::Exchange);
        assert_eq!(EntityCategory::Etf.to_string(), "ETFs");
    }
}

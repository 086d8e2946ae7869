//! Immutable snapshots handed to consumers.

use crate::core::model::{
    Asset, CalendarDay, Domain, EntityHolding, Indicator, SignalHistoryEntry, Source,
    TickerSnapshot,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ViewContent {
    /// Nothing has been published yet.
    Empty,
    Indicators(Vec<Indicator>),
    Entities(Vec<EntityHolding>),
    EconomicCalendar(Vec<CalendarDay>),
    SignalHistory(Vec<SignalHistoryEntry>),
    Ticker(TickerSnapshot),
}

impl ViewContent {
    pub fn is_empty(&self) -> bool {
        matches!(self, ViewContent::Empty)
    }
}

/// Latest published result for one `(domain, asset)` key.
///
/// A view is never mutated after construction; refreshing replaces it whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView {
    pub domain: Domain,
    pub asset: Option<Asset>,
    pub content: ViewContent,
    /// Completion time of the cycle that produced `content`.
    pub freshness: Option<DateTime<Utc>>,
    pub source: Option<Source>,
    /// Publication counter for this key, 0 for the initial empty view.
    pub version: u64,
}

impl AggregateView {
    pub fn empty(domain: Domain, asset: Option<Asset>) -> Self {
        Self {
            domain,
            asset,
            content: ViewContent::Empty,
            freshness: None,
            source: None,
            version: 0,
        }
    }

    /// The view that follows `self` with new content.
    pub fn succeed(&self, content: ViewContent, source: Source, at: DateTime<Utc>) -> Self {
        Self {
            domain: self.domain,
            asset: self.asset.clone(),
            content,
            freshness: Some(at),
            source: Some(source),
            version: self.version + 1,
        }
    }

    pub fn is_backup(&self) -> bool {
        self.source == Some(Source::Backup)
    }

    pub fn indicators(&self) -> &[Indicator] {
        match &self.content {
            ViewContent::Indicators(indicators) => indicators,
            _ => &[],
        }
    }

    pub fn holdings(&self) -> &[EntityHolding] {
        match &self.content {
            ViewContent::Entities(holdings) => holdings,
            _ => &[],
        }
    }

    pub fn calendar(&self) -> &[CalendarDay] {
        match &self.content {
            ViewContent::EconomicCalendar(days) => days,
            _ => &[],
        }
    }

    pub fn signal_history(&self) -> &[SignalHistoryEntry] {
        match &self.content {
            ViewContent::SignalHistory(entries) => entries,
            _ => &[],
        }
    }

    pub fn ticker(&self) -> Option<&TickerSnapshot> {
        match &self.content {
            ViewContent::Ticker(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

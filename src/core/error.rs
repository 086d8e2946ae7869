//! Error taxonomy shared by providers, the backup store and the scheduler.

use crate::core::model::{Asset, Domain};
use std::time::Duration;
use thiserror::Error;

/// What went wrong while talking to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderErrorKind {
    #[error("request error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Schema(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Any failure of a single provider call, tagged with the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{provider}: {kind}")]
pub struct ProviderError {
    pub provider: String,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, kind: ProviderErrorKind) -> Self {
        Self {
            provider: provider.into(),
            kind,
        }
    }

    pub fn schema(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::Schema(message.into()))
    }

    /// Normalizes a reqwest failure, keeping timeouts distinguishable.
    pub fn from_reqwest(provider: impl Into<String>, err: reqwest::Error, timeout: Duration) -> Self {
        let kind = if err.is_timeout() {
            ProviderErrorKind::Timeout(timeout)
        } else if err.is_decode() {
            ProviderErrorKind::Schema(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderErrorKind::Status(status.as_u16())
        } else {
            ProviderErrorKind::Transport(err.to_string())
        };
        Self::new(provider, kind)
    }
}

/// The backup document is missing, unreadable or has no usable entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("backup unavailable for {domain}{}: {reason}", asset.as_ref().map(|a| format!("/{a}")).unwrap_or_default())]
pub struct BackupUnavailable {
    pub domain: Domain,
    pub asset: Option<Asset>,
    pub reason: String,
}

impl BackupUnavailable {
    pub fn new(domain: Domain, asset: Option<&Asset>, reason: impl Into<String>) -> Self {
        Self {
            domain,
            asset: asset.cloned(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationError {
    #[error("insufficient data: need {needed} values, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("non-finite value in {0}")]
    NonFinite(String),
}

/// Everything that makes a live refresh fall back to the backup snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Computation(#[from] ComputationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_carries_provider_name() {
        let err = ProviderError::new("binance-klines", ProviderErrorKind::Status(500));
        assert_eq!(err.to_string(), "binance-klines: HTTP error: 500");

        let err = ProviderError::schema("signal-service-entities", "missing field `Entities`");
        assert_eq!(
            err.to_string(),
            "signal-service-entities: malformed payload: missing field `Entities`"
        );
    }

    #[test]
    fn test_backup_unavailable_message() {
        let asset = Asset::new("btc");
        let err = BackupUnavailable::new(Domain::Indicators, Some(&asset), "no entry");
        assert_eq!(err.to_string(), "backup unavailable for indicators/BTC: no entry");

        let err = BackupUnavailable::new(Domain::EconomicCalendar, None, "file missing");
        assert_eq!(
            err.to_string(),
            "backup unavailable for economic-calendar: file missing"
        );
    }
}

//! Provider abstraction

use crate::core::error::ProviderError;
use crate::core::model::{Asset, Domain};
use crate::core::observation::RawObservation;
use async_trait::async_trait;

/// Typed accessor to one external endpoint.
///
/// Implementations make exactly one request per call and never retry; the
/// next scheduled refresh is the retry.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Stable name used in logs and attached to every error.
    fn name(&self) -> &str;

    /// The domain whose views this endpoint feeds.
    fn domain(&self) -> Domain;

    /// `asset` is `None` for endpoints that are not keyed by asset.
    async fn fetch(&self, asset: Option<&Asset>) -> Result<RawObservation, ProviderError>;
}

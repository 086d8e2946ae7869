//! Core business logic abstractions

pub mod calendar;
pub mod config;
pub mod error;
pub mod holdings;
pub mod indicators;
pub mod log;
pub mod model;
pub mod numeric;
pub mod observation;
pub mod provider;
pub mod view;

// Re-export main types for cleaner imports
pub use error::{BackupUnavailable, ComputationError, ProviderError, ProviderErrorKind, RefreshError};
pub use model::{Asset, Decision, Domain, IndicatorKind, Source};
pub use observation::{Payload, RawObservation};
pub use provider::ProviderClient;
pub use view::{AggregateView, ViewContent};

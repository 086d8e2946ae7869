//! Scheduling of domain refreshes and publication into the view store.

pub mod domains;
pub mod engine;
pub mod poller;

pub use engine::{Engine, EngineHandle};
pub use poller::{DomainPoller, KeyOutcome, Poller, Refresh, RefreshState};

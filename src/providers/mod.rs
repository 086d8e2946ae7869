pub mod backup;
pub mod binance;
pub mod schema;
pub mod signal_service;
pub mod util;

pub use backup::BackupSnapshotStore;
pub use binance::{BinanceClient, BinanceEndpoint};
pub use signal_service::{ServiceEndpoint, SignalServiceClient};

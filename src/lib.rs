pub mod aggregation;
pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use anyhow::Result;
use crate::core::config::AppConfig;
use tracing::{debug, info};

pub enum AppCommand {
    /// Keep refreshing and redraw the dashboard.
    Run,
    /// Refresh once and print the dashboard.
    Show,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("tradar starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Run => cli::run(&config).await,
        AppCommand::Show => cli::show(&config).await,
    }
}

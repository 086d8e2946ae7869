pub mod dashboard;
pub mod setup;
pub mod ui;

use crate::aggregation::{Engine, RefreshState};
use crate::core::config::AppConfig;
use crate::core::model::Domain;
use anyhow::{Context, Result};
use tracing::warn;

/// Refreshes every domain once and prints the dashboard.
pub async fn show(config: &AppConfig) -> Result<()> {
    let engine = Engine::from_config(config)?;

    let spinner = ui::new_spinner("Refreshing...");
    let outcomes = engine.refresh_once().await;
    spinner.finish_and_clear();

    for (domain, outcome) in &outcomes {
        if outcome.state == RefreshState::Stale {
            warn!(%domain, asset = ?outcome.asset, "No live or backup data");
        }
    }

    println!("{}", dashboard::render(&engine.store(), engine.assets()));
    Ok(())
}

/// Runs the engine and redraws the dashboard until interrupted.
pub async fn run(config: &AppConfig) -> Result<()> {
    let handle = Engine::from_config(config)?.start().await;
    let term = console::Term::stdout();
    let mut redraw = tokio::time::interval(config.intervals.for_domain(Domain::Ticker));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result.context("Failed to listen for Ctrl-C")?;
                break;
            }
            _ = redraw.tick() => {
                term.clear_screen()?;
                let engine = handle.engine();
                println!("{}", dashboard::render(&engine.store(), engine.assets()));
                ui::print_separator();
                println!("{}", ui::style_text("Press Ctrl-C to exit", ui::StyleType::Subtle));
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

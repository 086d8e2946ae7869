use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tradar::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Keep refreshing and display the dashboard until Ctrl-C
    Run,
    /// Refresh every domain once and display the dashboard
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => tradar::cli::setup::setup(),
        Some(Commands::Run) => {
            tradar::run_command(tradar::AppCommand::Run, cli.config_path.as_deref()).await
        }
        Some(Commands::Show) => {
            tradar::run_command(tradar::AppCommand::Show, cli.config_path.as_deref()).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

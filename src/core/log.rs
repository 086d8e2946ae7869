use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Crate level and fallback `RUST_LOG` directive for a run.
///
/// Quiet unless verbose: `tradar run` redraws stdout in place, so any record
/// on the terminal would tear the dashboard.
fn default_filters(verbose: bool) -> (LevelFilter, &'static str) {
    if verbose {
        (LevelFilter::DEBUG, "warn,tradar=debug")
    } else {
        (LevelFilter::OFF, "off")
    }
}

/// Installs the global subscriber. Records go to stderr; `RUST_LOG` overrides
/// the default directive.
pub fn init_logging(verbose: bool) {
    let (level_filter, level) = default_filters(verbose);
    let app_filter = Targets::new()
        .with_target("tradar", level_filter)
        .with_default(LevelFilter::WARN);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(app_filter)
        .with(env_filter)
        .init();
}

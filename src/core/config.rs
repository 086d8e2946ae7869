use crate::core::model::{Asset, Domain};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Upper bound for the derived per-request timeout.
const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BinanceProviderConfig {
    pub spot_url: String,
    pub futures_url: String,
}

impl Default for BinanceProviderConfig {
    fn default() -> Self {
        BinanceProviderConfig {
            spot_url: "https://api.binance.com".to_string(),
            futures_url: "https://fapi.binance.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SignalServiceConfig {
    pub base_url: String,
}

impl Default for SignalServiceConfig {
    fn default() -> Self {
        SignalServiceConfig {
            base_url: "http://localhost:5002".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub binance: BinanceProviderConfig,
    #[serde(default)]
    pub signal_service: SignalServiceConfig,
}

/// Refresh interval of every domain, in seconds.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct IntervalsConfig {
    pub indicators: u64,
    pub entities: u64,
    pub economic_calendar: u64,
    pub signal_history: u64,
    pub ticker: u64,
}

impl Default for IntervalsConfig {
    fn default() -> Self {
        IntervalsConfig {
            indicators: 60,
            entities: 60,
            economic_calendar: 300,
            signal_history: 10,
            ticker: 5,
        }
    }
}

impl IntervalsConfig {
    pub fn for_domain(&self, domain: Domain) -> Duration {
        let secs = match domain {
            Domain::Indicators => self.indicators,
            Domain::Entities => self.entities,
            Domain::EconomicCalendar => self.economic_calendar,
            Domain::SignalHistory => self.signal_history,
            Domain::Ticker => self.ticker,
        };
        Duration::from_secs(secs.max(1))
    }
}

fn default_assets() -> Vec<Asset> {
    ["BTC", "ETH", "SOL"].into_iter().map(Asset::new).collect()
}

fn default_quote() -> String {
    "USDT".to_string()
}

fn default_backup_path() -> PathBuf {
    PathBuf::from("backup_data.json")
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_assets")]
    pub assets: Vec<Asset>,
    #[serde(default = "default_quote")]
    pub quote: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_backup_path")]
    pub backup_path: PathBuf,
    /// Publish the backup snapshot before the first live cycle completes.
    #[serde(default = "default_true")]
    pub seed_from_backup: bool,
    #[serde(default)]
    pub intervals: IntervalsConfig,
    /// Overrides the per-request timeout derived from each interval.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            assets: default_assets(),
            quote: default_quote(),
            providers: ProvidersConfig::default(),
            backup_path: default_backup_path(),
            seed_from_backup: true,
            intervals: IntervalsConfig::default(),
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "tradar", "tradar")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.assets.is_empty() {
            anyhow::bail!("At least one asset must be configured");
        }
        if self.quote.trim().is_empty() {
            anyhow::bail!("Quote currency must not be empty");
        }
        Ok(())
    }

    /// Timeout for a single provider request of `domain`: half the refresh
    /// interval so a hung call never overlaps the next tick.
    pub fn request_timeout(&self, domain: Domain) -> Duration {
        match self.request_timeout_secs {
            Some(secs) => Duration::from_secs(secs.max(1)),
            None => (self.intervals.for_domain(domain) / 2).min(MAX_REQUEST_TIMEOUT),
        }
    }
}

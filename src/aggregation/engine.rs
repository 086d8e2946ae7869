use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::aggregation::domains::DomainRefresh;
use crate::aggregation::poller::{DomainPoller, KeyOutcome, Poller, RefreshState};
use crate::core::config::AppConfig;
use crate::core::model::{Asset, Domain};
use crate::core::provider::ProviderClient;
use crate::core::view::AggregateView;
use crate::providers::{
    BackupSnapshotStore, BinanceClient, BinanceEndpoint, ServiceEndpoint, SignalServiceClient,
};
use crate::store::AggregateViewStore;

/// Provider clients feeding one domain.
fn providers_for(config: &AppConfig, domain: Domain) -> Result<Vec<Arc<dyn ProviderClient>>> {
    let timeout = config.request_timeout(domain);
    let binance = |endpoint| -> Result<Arc<dyn ProviderClient>> {
        Ok(Arc::new(BinanceClient::new(
            &config.providers.binance,
            endpoint,
            &config.quote,
            timeout,
        )?))
    };
    let service = |endpoint| -> Result<Arc<dyn ProviderClient>> {
        Ok(Arc::new(SignalServiceClient::new(
            &config.providers.signal_service,
            endpoint,
            &config.quote,
            timeout,
        )?))
    };

    let providers = match domain {
        Domain::Indicators => vec![
            binance(BinanceEndpoint::Klines)?,
            binance(BinanceEndpoint::TickerPrice)?,
            binance(BinanceEndpoint::FundingRate)?,
            service(ServiceEndpoint::Indicators)?,
            service(ServiceEndpoint::FearGreed)?,
            service(ServiceEndpoint::MiningCost)?,
            service(ServiceEndpoint::SearchInterest)?,
        ],
        Domain::Entities => vec![service(ServiceEndpoint::Entities)?],
        Domain::EconomicCalendar => vec![service(ServiceEndpoint::EconomicCalendar)?],
        Domain::SignalHistory => vec![service(ServiceEndpoint::SignalHistory)?],
        Domain::Ticker => vec![binance(BinanceEndpoint::Ticker24h)?],
    };
    Ok(providers)
}

/// Owns the view store and one poller per domain.
pub struct Engine {
    assets: Vec<Asset>,
    seed_on_start: bool,
    store: Arc<AggregateViewStore>,
    pollers: Vec<Arc<dyn DomainPoller>>,
}

impl Engine {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = Arc::new(AggregateViewStore::new(&config.assets));
        let backup = Arc::new(BackupSnapshotStore::from_path(&config.backup_path));

        let mut pollers: Vec<Arc<dyn DomainPoller>> = Vec::new();
        for domain in Domain::ALL {
            let refresh = DomainRefresh::new(
                domain,
                providers_for(config, domain)?,
                Arc::clone(&backup),
            );
            pollers.push(Arc::new(Poller::new(
                refresh,
                Arc::clone(&store),
                &config.assets,
                config.intervals.for_domain(domain),
            )));
        }
        debug!(assets = ?config.assets, "Engine configured");

        Ok(Engine {
            assets: config.assets.clone(),
            seed_on_start: config.seed_from_backup,
            store,
            pollers,
        })
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn store(&self) -> Arc<AggregateViewStore> {
        Arc::clone(&self.store)
    }

    pub fn current(&self, domain: Domain, asset: Option<&Asset>) -> Option<Arc<AggregateView>> {
        self.store.current(domain, asset)
    }

    pub fn state(&self, domain: Domain, asset: Option<&Asset>) -> Option<RefreshState> {
        self.pollers
            .iter()
            .find(|p| p.domain() == domain)
            .and_then(|p| p.state(asset))
    }

    /// Publishes the backup snapshot for every key that is still empty.
    pub async fn seed_from_backup(&self) -> usize {
        let seeded: usize = join_all(self.pollers.iter().map(|p| p.seed())).await.into_iter().sum();
        info!(seeded, "Seeded views from backup");
        seeded
    }

    /// Runs a single cycle of every domain concurrently.
    pub async fn refresh_once(&self) -> Vec<(Domain, KeyOutcome)> {
        let cycles = join_all(self.pollers.iter().map(|p| async move {
            let domain = p.domain();
            p.run_cycle()
                .await
                .into_iter()
                .map(move |outcome| (domain, outcome))
                .collect::<Vec<_>>()
        }))
        .await;
        cycles.into_iter().flatten().collect()
    }

    /// Seeds (when configured) and spawns one polling task per domain.
    pub async fn start(self) -> EngineHandle {
        if self.seed_on_start {
            self.seed_from_backup().await;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let tasks = self
            .pollers
            .iter()
            .map(|poller| {
                let poller = Arc::clone(poller);
                let shutdown = shutdown_rx.clone();
                tokio::spawn(async move { poller.run(shutdown).await })
            })
            .collect();
        info!(domains = self.pollers.len(), "Engine started");

        EngineHandle {
            engine: self,
            shutdown_tx,
            tasks,
        }
    }
}

/// A running engine. Dropping it also stops the pollers, since they treat a
/// closed shutdown channel as a stop signal, but without waiting for them.
pub struct EngineHandle {
    engine: Engine,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn current(&self, domain: Domain, asset: Option<&Asset>) -> Option<Arc<AggregateView>> {
        self.engine.current(domain, asset)
    }

    /// Stops every poller, cancelling in-flight cycles without publishing.
    pub async fn shutdown(self) {
        self.shutdown_tx.send_replace(true);
        for result in join_all(self.tasks).await {
            if let Err(e) = result {
                warn!(error = %e, "Poller task failed");
            }
        }
        info!("Engine stopped");
    }
}

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::core::error::{BackupUnavailable, RefreshError};
use crate::core::model::{Asset, Domain, Source};
use crate::core::view::ViewContent;
use crate::store::AggregateViewStore;

/// Live and backup production of one domain's view content.
#[async_trait]
pub trait Refresh: Send + Sync + 'static {
    fn domain(&self) -> Domain;

    async fn live(&self, asset: Option<&Asset>) -> Result<ViewContent, RefreshError>;

    async fn backup(&self, asset: Option<&Asset>) -> Result<ViewContent, BackupUnavailable>;
}

/// Where a key stands in its current or last cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Fetching,
    /// Live data was published.
    Applied,
    /// Live failed and the backup was published.
    FallbackApplied,
    /// Live and backup both failed; the previous view is kept.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    pub asset: Option<Asset>,
    pub state: RefreshState,
}

/// Object-safe face of a [`Poller`], so domains with different refreshers
/// can be driven together.
#[async_trait]
pub trait DomainPoller: Send + Sync {
    fn domain(&self) -> Domain;

    fn state(&self, asset: Option<&Asset>) -> Option<RefreshState>;

    /// Publishes the backup for every key that has no view yet.
    async fn seed(&self) -> usize;

    async fn run_cycle(&self) -> Vec<KeyOutcome>;

    /// Runs cycles on the interval until `shutdown` flips to true.
    async fn run(&self, shutdown: watch::Receiver<bool>);
}

/// Periodic refresher of one domain.
pub struct Poller<R: Refresh> {
    refresh: R,
    store: Arc<AggregateViewStore>,
    interval: Duration,
    states: HashMap<Option<Asset>, watch::Sender<RefreshState>>,
}

impl<R: Refresh> Poller<R> {
    pub fn new(
        refresh: R,
        store: Arc<AggregateViewStore>,
        assets: &[Asset],
        interval: Duration,
    ) -> Self {
        let keys: Vec<Option<Asset>> = if refresh.domain().is_per_asset() {
            assets.iter().cloned().map(Some).collect()
        } else {
            vec![None]
        };
        let states = keys
            .into_iter()
            .map(|key| (key, watch::Sender::new(RefreshState::Idle)))
            .collect();
        Poller {
            refresh,
            store,
            interval,
            states,
        }
    }

    fn keys(&self) -> Vec<Option<Asset>> {
        let mut keys: Vec<Option<Asset>> = self.states.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn set_state(&self, asset: Option<&Asset>, state: RefreshState) {
        if let Some(tx) = self.states.get(&asset.cloned()) {
            tx.send_replace(state);
        }
    }

    fn publish(&self, asset: Option<&Asset>, content: ViewContent, source: Source) {
        let domain = self.refresh.domain();
        match self.store.update(domain, asset, |current| {
            Some(current.succeed(content, source, Utc::now()))
        }) {
            Some(view) => info!(%domain, ?asset, %source, version = view.version, "Published view"),
            None => warn!(%domain, ?asset, "Dropping view for untracked key"),
        }
    }

    /// Publishes the backup only if the key still has no view once the
    /// store's lock is held.
    fn publish_seed(&self, asset: Option<&Asset>, content: ViewContent) -> bool {
        let domain = self.refresh.domain();
        let seeded = self.store.update(domain, asset, |current| {
            current
                .content
                .is_empty()
                .then(|| current.succeed(content, Source::Backup, Utc::now()))
        });
        match seeded {
            Some(view) => {
                info!(%domain, ?asset, version = view.version, "Seeded view from backup");
                true
            }
            None => {
                debug!(%domain, ?asset, "View filled before seeding finished");
                false
            }
        }
    }

    /// Keys whose cycle was dropped mid-flight go back to `Idle`.
    fn reset_interrupted(&self) {
        for tx in self.states.values() {
            tx.send_if_modified(|state| {
                if *state == RefreshState::Fetching {
                    *state = RefreshState::Idle;
                    true
                } else {
                    false
                }
            });
        }
    }

    /// One live attempt, then at most one backup attempt.
    async fn refresh_key(&self, asset: Option<&Asset>) -> RefreshState {
        let domain = self.refresh.domain();
        self.set_state(asset, RefreshState::Fetching);

        let state = match self.refresh.live(asset).await {
            Ok(content) => {
                self.publish(asset, content, Source::Live);
                RefreshState::Applied
            }
            Err(err) => {
                warn!(%domain, ?asset, error = %err, "Live refresh failed, using backup");
                match self.refresh.backup(asset).await {
                    Ok(content) => {
                        self.publish(asset, content, Source::Backup);
                        RefreshState::FallbackApplied
                    }
                    Err(err) => {
                        warn!(%domain, ?asset, error = %err, "Keeping previous view");
                        RefreshState::Stale
                    }
                }
            }
        };

        self.set_state(asset, state);
        state
    }
}

#[async_trait]
impl<R: Refresh> DomainPoller for Poller<R> {
    fn domain(&self) -> Domain {
        self.refresh.domain()
    }

    fn state(&self, asset: Option<&Asset>) -> Option<RefreshState> {
        let asset = if self.domain().is_per_asset() {
            asset.cloned()
        } else {
            None
        };
        self.states.get(&asset).map(|tx| *tx.borrow())
    }

    async fn seed(&self) -> usize {
        let domain = self.domain();
        let mut seeded = 0;
        for asset in self.keys() {
            let asset = asset.as_ref();
            let is_empty = self
                .store
                .current(domain, asset)
                .is_some_and(|view| view.content.is_empty());
            if !is_empty {
                continue;
            }
            match self.refresh.backup(asset).await {
                Ok(content) => {
                    if self.publish_seed(asset, content) {
                        seeded += 1;
                    }
                }
                Err(err) => debug!(%domain, ?asset, error = %err, "No backup to seed from"),
            }
        }
        seeded
    }

    async fn run_cycle(&self) -> Vec<KeyOutcome> {
        let keys = self.keys();
        let states = join_all(keys.iter().map(|asset| self.refresh_key(asset.as_ref()))).await;
        keys.into_iter()
            .zip(states)
            .map(|(asset, state)| KeyOutcome { asset, state })
            .collect()
    }

    async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let domain = self.domain();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(%domain, interval = ?self.interval, "Poller started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    debug!(%domain, "Cancelled in-flight cycle");
                    self.reset_interrupted();
                    if changed.is_err() {
                        break;
                    }
                }
                outcomes = self.run_cycle() => {
                    debug!(%domain, ?outcomes, "Cycle complete");
                }
            }
        }

        info!(%domain, "Poller stopped");
    }
}

use crate::core::model::{Asset, Domain};
use crate::core::view::AggregateView;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Identifies one tracked view. Global domains carry no asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewKey {
    pub domain: Domain,
    pub asset: Option<Asset>,
}

impl ViewKey {
    /// Builds the key, dropping the asset for domains that are not per-asset.
    pub fn new(domain: Domain, asset: Option<&Asset>) -> Self {
        let asset = if domain.is_per_asset() {
            asset.cloned()
        } else {
            None
        };
        ViewKey { domain, asset }
    }
}

/// Latest view of every tracked key.
///
/// The key set is fixed at construction. Each key owns a watch channel, so
/// publishing swaps an `Arc` and readers never block on a refresh in progress.
pub struct AggregateViewStore {
    channels: HashMap<ViewKey, watch::Sender<Arc<AggregateView>>>,
}

impl AggregateViewStore {
    pub fn new(assets: &[Asset]) -> Self {
        let mut channels = HashMap::new();
        for domain in Domain::ALL {
            let assets: Vec<Option<&Asset>> = if domain.is_per_asset() {
                assets.iter().map(Some).collect()
            } else {
                vec![None]
            };
            for asset in assets {
                let key = ViewKey::new(domain, asset);
                let (tx, _rx) = watch::channel(Arc::new(AggregateView::empty(
                    domain,
                    key.asset.clone(),
                )));
                channels.insert(key, tx);
            }
        }
        AggregateViewStore { channels }
    }

    /// Latest view, or `None` if the key is not tracked.
    pub fn current(&self, domain: Domain, asset: Option<&Asset>) -> Option<Arc<AggregateView>> {
        self.channels
            .get(&ViewKey::new(domain, asset))
            .map(|tx| Arc::clone(&tx.borrow()))
    }

    pub fn subscribe(
        &self,
        domain: Domain,
        asset: Option<&Asset>,
    ) -> Option<watch::Receiver<Arc<AggregateView>>> {
        self.channels
            .get(&ViewKey::new(domain, asset))
            .map(watch::Sender::subscribe)
    }

    /// Replaces the view of its key. Returns false for untracked keys.
    pub fn publish(&self, view: AggregateView) -> bool {
        let key = ViewKey::new(view.domain, view.asset.as_ref());
        match self.channels.get(&key) {
            Some(tx) => {
                tx.send_replace(Arc::new(view));
                true
            }
            None => false,
        }
    }

    /// Derives the next view of a key from its current one and publishes it,
    /// holding the channel's write lock throughout so no concurrent
    /// publication can slip in between. `next` returning `None` leaves the
    /// view untouched.
    ///
    /// Returns the published view, or `None` if the key is untracked or
    /// `next` declined.
    pub fn update<F>(
        &self,
        domain: Domain,
        asset: Option<&Asset>,
        next: F,
    ) -> Option<Arc<AggregateView>>
    where
        F: FnOnce(&AggregateView) -> Option<AggregateView>,
    {
        let tx = self.channels.get(&ViewKey::new(domain, asset))?;
        let mut published = None;
        tx.send_if_modified(|current| match next(&**current) {
            Some(view) => {
                let view = Arc::new(view);
                *current = Arc::clone(&view);
                published = Some(view);
                true
            }
            None => false,
        });
        published
    }

    /// Tracked keys, sorted.
    pub fn keys(&self) -> Vec<ViewKey> {
        let mut keys: Vec<ViewKey> = self.channels.keys().cloned().collect();
        keys.sort();
        keys
    }
}

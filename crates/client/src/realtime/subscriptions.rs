use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use judging::RoundKey;
use judging::dto::judging::ScoreUpdate;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::channel::{CloseHook, EventSink, PushConnection, PushConnector};
use crate::cache::{QueryCache, QueryKey};
use crate::error::Result;

const VIEWER_CHANNEL_CAPACITY: usize = 16;

struct Viewers {
    count: usize,
    updates: broadcast::Sender<ScoreUpdate>,
}

#[derive(Default)]
struct State {
    viewers: HashMap<RoundKey, Viewers>,
    connection: Option<Box<dyn PushConnection>>,
    /// Bumped for every connect attempt; close hooks of older connections are ignored.
    generation: u64,
    /// Generation whose connection ended before it was stored.
    lost_generation: Option<u64>,
}

struct Inner {
    connector: Arc<dyn PushConnector>,
    cache: QueryCache,
    state: Mutex<State>,
    connect_lock: tokio::sync::Mutex<()>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn route(&self, update: ScoreUpdate) {
        let state = self.state();
        match state.viewers.get(&update) {
            Some(viewers) => {
                self.cache.invalidate(&QueryKey::ScoreSheet(update));
                // receivers may all be mid-drop; nothing to deliver then
                let _ = viewers.updates.send(update);
                debug!(%update, viewers = viewers.count, "score sheet invalidated");
            }
            None => debug!(%update, "no viewers, ignoring score-update"),
        }
    }

    /// The connection of `generation` ended without being asked to. Viewers
    /// see their update stream end; the next subscribe reconnects.
    fn connection_lost(&self, generation: u64) {
        let mut state = self.state();
        if state.generation != generation {
            return;
        }
        if state.connection.take().is_none() {
            state.lost_generation = Some(generation);
        }
        for viewers in state.viewers.values_mut() {
            // dropping the old sender closes every receiver of this round
            viewers.updates = broadcast::channel(VIEWER_CHANNEL_CAPACITY).0;
        }
        warn!(
            viewers = state.viewers.len(),
            "Push channel lost, live updates stopped"
        );
    }

    fn release(&self, key: RoundKey) {
        let mut state = self.state();
        if let Some(viewers) = state.viewers.get_mut(&key) {
            viewers.count -= 1;
            if viewers.count == 0 {
                state.viewers.remove(&key);
            }
        }

        if state.viewers.is_empty()
            && let Some(mut connection) = state.connection.take()
        {
            connection.close();
            info!("Last score sheet viewer left, push channel closed");
        }
    }
}

/// Process-wide owner of the push connection.
///
/// Viewers subscribe per round; the connection is opened for the first
/// viewer and closed when the last one leaves. A `score-update` for a round
/// with viewers invalidates its cached score sheet and wakes those viewers;
/// updates for other rounds are dropped.
#[derive(Clone)]
pub struct SubscriptionManager {
    inner: Arc<Inner>,
}

impl SubscriptionManager {
    pub fn new(connector: Arc<dyn PushConnector>, cache: QueryCache) -> Self {
        Self {
            inner: Arc::new(Inner {
                connector,
                cache,
                state: Mutex::new(State::default()),
                connect_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub async fn subscribe(&self, key: RoundKey) -> Result<Subscription> {
        let _connecting = self.inner.connect_lock.lock().await;

        let (receiver, generation) = {
            let mut state = self.inner.state();
            let viewers = state.viewers.entry(key).or_insert_with(|| Viewers {
                count: 0,
                updates: broadcast::channel(VIEWER_CHANNEL_CAPACITY).0,
            });
            viewers.count += 1;
            let receiver = viewers.updates.subscribe();
            let generation = if state.connection.is_none() {
                state.generation += 1;
                Some(state.generation)
            } else {
                None
            };
            (receiver, generation)
        };

        let subscription = Subscription {
            key,
            receiver,
            inner: Arc::clone(&self.inner),
        };

        if let Some(generation) = generation {
            let weak: Weak<Inner> = Arc::downgrade(&self.inner);
            let sink: EventSink = Arc::new(move |update| {
                if let Some(inner) = weak.upgrade() {
                    inner.route(update);
                }
            });
            let weak: Weak<Inner> = Arc::downgrade(&self.inner);
            let on_close: CloseHook = Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.connection_lost(generation);
                }
            });

            // on failure the subscription is dropped, which undoes the registration
            let mut connection = self.inner.connector.connect(sink, on_close).await?;
            let mut state = self.inner.state();
            if state.lost_generation == Some(generation) {
                connection.close();
                warn!("Push channel for {} ended while connecting", key);
            } else {
                state.connection = Some(connection);
                info!("Push channel opened for {}", key);
            }
        }

        Ok(subscription)
    }

    pub fn viewer_count(&self, key: RoundKey) -> usize {
        self.inner
            .state()
            .viewers
            .get(&key)
            .map_or(0, |v| v.count)
    }

    pub fn is_connected(&self) -> bool {
        self.inner.state().connection.is_some()
    }
}

/// A live interest in one round's score updates. Dropping it unsubscribes.
pub struct Subscription {
    key: RoundKey,
    receiver: broadcast::Receiver<ScoreUpdate>,
    inner: Arc<Inner>,
}

impl Subscription {
    pub fn key(&self) -> RoundKey {
        self.key
    }

    /// Wait for the next update of this round. `None` once the manager is gone.
    pub async fn changed(&mut self) -> Option<ScoreUpdate> {
        match self.receiver.recv().await {
            Ok(update) => Some(update),
            // missed updates collapse into one refetch
            Err(broadcast::error::RecvError::Lagged(_)) => Some(self.key),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Drain pending updates without waiting; returns whether any arrived.
    pub fn take_pending(&mut self) -> bool {
        let mut pending = false;
        loop {
            match self.receiver.try_recv() {
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => pending = true,
                Err(_) => return pending,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.inner.release(self.key);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MockConnector;
    use super::*;
    use std::sync::atomic::Ordering;

    fn manager() -> (SubscriptionManager, Arc<MockConnector>, QueryCache) {
        let connector = Arc::new(MockConnector::default());
        let cache = QueryCache::default();
        let manager = SubscriptionManager::new(connector.clone(), cache.clone());
        (manager, connector, cache)
    }

    #[tokio::test]
    async fn test_connection_is_ref_counted() {
        let (manager, connector, _) = manager();
        let key = RoundKey::new(5, 2);

        let first = manager.subscribe(key).await.unwrap();
        let second = manager.subscribe(key).await.unwrap();
        let other = manager.subscribe(RoundKey::new(6, 1)).await.unwrap();

        assert_eq!(connector.connects(), 1);
        assert_eq!(manager.viewer_count(key), 2);

        drop(first);
        drop(other);
        assert!(manager.is_connected());
        assert_eq!(connector.closes(), 0);

        drop(second);
        assert!(!manager.is_connected());
        assert_eq!(manager.viewer_count(key), 0);
        assert_eq!(connector.closes(), 1);

        // remount starts a fresh connection
        let _again = manager.subscribe(key).await.unwrap();
        assert_eq!(connector.connects(), 2);
    }

    #[tokio::test]
    async fn test_updates_routed_to_matching_round_only() {
        let (manager, connector, cache) = manager();
        let viewed = RoundKey::new(5, 2);
        cache.set(QueryKey::ScoreSheet(viewed), 1u32);
        cache.set(QueryKey::ScoreSheet(RoundKey::new(5, 3)), 1u32);

        let mut subscription = manager.subscribe(viewed).await.unwrap();

        connector.emit(RoundKey::new(5, 3));
        assert!(!subscription.take_pending());
        assert!(cache.is_fresh(&QueryKey::ScoreSheet(viewed)));
        // no viewer for (5,3), so its cache entry is untouched too
        assert!(cache.is_fresh(&QueryKey::ScoreSheet(RoundKey::new(5, 3))));

        connector.emit(viewed);
        assert_eq!(subscription.changed().await, Some(viewed));
        assert!(!cache.is_fresh(&QueryKey::ScoreSheet(viewed)));
        assert!(!subscription.take_pending());
    }

    #[tokio::test]
    async fn test_server_disconnect_ends_streams_and_reconnects() {
        let (manager, connector, _) = manager();
        let key = RoundKey::new(5, 2);

        let mut subscription = manager.subscribe(key).await.unwrap();
        connector.disconnect();

        assert!(!manager.is_connected());
        assert_eq!(subscription.changed().await, None);
        assert_eq!(manager.viewer_count(key), 1);

        let mut second = manager.subscribe(key).await.unwrap();
        assert_eq!(connector.connects(), 2);
        assert!(manager.is_connected());

        connector.emit(key);
        assert_eq!(second.changed().await, Some(key));

        drop(subscription);
        assert!(manager.is_connected());
        drop(second);
        assert!(!manager.is_connected());
        assert_eq!(manager.viewer_count(key), 0);
    }

    #[tokio::test]
    async fn test_failed_connect_rolls_back_registration() {
        let (manager, connector, _) = manager();
        connector.fail.store(true, Ordering::SeqCst);

        assert!(manager.subscribe(RoundKey::new(1, 1)).await.is_err());
        assert_eq!(manager.viewer_count(RoundKey::new(1, 1)), 0);
        assert!(!manager.is_connected());

        connector.fail.store(false, Ordering::SeqCst);
        let _subscription = manager.subscribe(RoundKey::new(1, 1)).await.unwrap();
        assert!(manager.is_connected());
    }
}

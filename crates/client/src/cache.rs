use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use judging::RoundKey;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::Result;

/// Semantic identity of a cached server response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    JudgeRounds,
    JudgeTeams(RoundKey),
    ScoreSheet(RoundKey),
    PublishedEvents,
    PublishedEvent(i32),
    EventWinners(i32),
    AllWinners,
}

impl QueryKey {
    pub fn round(&self) -> Option<RoundKey> {
        match self {
            Self::JudgeTeams(key) | Self::ScoreSheet(key) => Some(*key),
            _ => None,
        }
    }
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
    invalidated: bool,
}

impl Entry {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < stale_time
    }
}

struct Inner {
    entries: std::sync::Mutex<HashMap<QueryKey, Entry>>,
    inflight: Mutex<HashMap<QueryKey, Arc<Mutex<()>>>>,
    stale_time: Duration,
}

/// Client-side cache of server responses.
///
/// Entries are served while fresh; invalidated or stale entries are refetched
/// on the next read. Concurrent reads of the same key share one fetch.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl QueryCache {
    pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(60);

    pub fn new(stale_time: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: std::sync::Mutex::new(HashMap::new()),
                inflight: Mutex::new(HashMap::new()),
                stale_time,
            }),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entries = self.entries();
        let entry = entries.get(key)?;
        if !entry.is_fresh(self.inner.stale_time) {
            return None;
        }
        Arc::clone(&entry.value).downcast::<T>().ok()
    }

    /// Last value stored under `key`, fresh or not.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entries = self.entries();
        let entry = entries.get(key)?;
        Arc::clone(&entry.value).downcast::<T>().ok()
    }

    pub fn set<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.entries().insert(
            key,
            Entry {
                value: value.clone(),
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
        value
    }

    /// Return the cached value for `key`, running `fetch` when it is missing,
    /// stale or invalidated. A failed fetch leaves any previous value in place.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.fresh::<T>(&key) {
            return Ok(value);
        }

        let lock = {
            let mut inflight = self.inner.inflight.lock().await;
            Arc::clone(
                inflight
                    .entry(key)
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        let _guard = lock.lock().await;

        // another caller may have completed the fetch while we waited
        if let Some(value) = self.fresh::<T>(&key) {
            return Ok(value);
        }

        debug!(?key, "fetching");
        let value = fetch().await?;
        Ok(self.set(key, value))
    }

    /// Mark `key` stale so the next read refetches. Returns whether an entry existed.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        match self.entries().get_mut(key) {
            Some(entry) => {
                entry.invalidated = true;
                debug!(?key, "invalidated");
                true
            }
            None => false,
        }
    }

    pub fn invalidate_round(&self, round: RoundKey) {
        for (key, entry) in self.entries().iter_mut() {
            if key.round() == Some(round) {
                entry.invalidated = true;
            }
        }
    }

    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.entries()
            .get(key)
            .is_some_and(|e| e.is_fresh(self.inner.stale_time))
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STALE_TIME)
    }
}

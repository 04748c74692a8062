use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{QueryConfig, QueryFilter, QueryKey, QueryResult, QueryStatus};
use crate::error::ResourceError;

type SharedFetch = Shared<BoxFuture<'static, Result<Value, ResourceError>>>;

struct Entry {
    data: Option<Value>,
    error: Option<ResourceError>,
    updated_at: Option<Instant>,
    invalidated: bool,
    /// Sequence number of the fetch allowed to write back, and its future.
    in_flight: Option<(u64, SharedFetch)>,
    fetch_seq: u64,
    observers: usize,
    idle_since: Option<Instant>,
}

impl Entry {
    fn new(now: Instant) -> Self {
        Entry {
            data: None,
            error: None,
            updated_at: None,
            invalidated: false,
            in_flight: None,
            fetch_seq: 0,
            observers: 0,
            idle_since: Some(now),
        }
    }

    fn is_stale(&self, now: &Instant, config: &QueryConfig) -> bool {
        match self.updated_at {
            Some(at) => self.invalidated || now.duration_since(at) >= config.stale_time,
            None => true,
        }
    }

    fn is_fresh(&self, now: &Instant, config: &QueryConfig) -> bool {
        self.data.is_some() && self.error.is_none() && !self.is_stale(now, config)
    }

    /// Drop any in-flight fetch so its result is never written back.
    fn detach_fetch(&mut self) {
        self.in_flight = None;
        self.fetch_seq += 1;
    }

    fn status(&self) -> QueryStatus {
        if self.error.is_some() {
            QueryStatus::Error
        } else if self.data.is_some() {
            QueryStatus::Success
        } else {
            QueryStatus::Pending
        }
    }
}

struct State {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    config: QueryConfig,
}

impl State {
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        // Entries stay consistent between statements, so a poisoned guard is usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Lock the entries, dropping any that have expired.
    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        let mut entries = self.lock();
        self.sweep(&mut entries);
        entries
    }

    fn sweep(&self, entries: &mut HashMap<QueryKey, Entry>) -> usize {
        let gc_time = self.config.gc_time;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|key, entry| {
            let expired = entry.observers == 0
                && entry.in_flight.is_none()
                && entry
                    .idle_since
                    .map(|since| now.duration_since(since) >= gc_time)
                    .unwrap_or(false);
            if expired {
                debug!(%key, "query entry collected");
            }
            !expired
        });
        before - entries.len()
    }
}

/// Keyed read cache shared by every view of an application.
///
/// Clone-friendly via Arc: clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    state: Arc<State>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}

impl QueryCache {
    pub fn new(config: QueryConfig) -> Self {
        QueryCache {
            state: Arc::new(State {
                entries: Mutex::new(HashMap::new()),
                config,
            }),
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.state.config
    }

    /// Read `key`, calling `fetcher` unless the cached data is fresh.
    ///
    /// Concurrent reads of the same key share one in-flight fetch. Transport
    /// failures are retried up to `retry` times. On final failure the previous
    /// data stays available next to the error.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> QueryResult<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ResourceError>> + Send + 'static,
    {
        let config = self.state.config;

        let (seq, fetch) = {
            let mut entries = self.state.entries();
            let now = Instant::now();
            let entry = entries.entry(key.clone()).or_insert_with(|| Entry::new(now));

            if entry.is_fresh(&now, &config) {
                debug!(%key, "query cache hit");
                return snapshot(key, entry, &now, &config);
            }

            match &entry.in_flight {
                Some((seq, fetch)) => {
                    debug!(%key, "joining in-flight fetch");
                    (*seq, fetch.clone())
                }
                None => {
                    entry.fetch_seq += 1;
                    let seq = entry.fetch_seq;
                    let fetch = start_fetch(key.clone(), fetcher, config);
                    entry.in_flight = Some((seq, fetch.clone()));
                    debug!(%key, seq, "fetch started");
                    (seq, fetch)
                }
            }
        };

        let outcome = fetch.await;

        let mut entries = self.state.entries();
        let now = Instant::now();
        let entry = entries.entry(key.clone()).or_insert_with(|| Entry::new(now));

        let owns_entry = matches!(&entry.in_flight, Some((current, _)) if *current == seq);
        if owns_entry {
            entry.in_flight = None;
            if entry.observers == 0 {
                entry.idle_since = Some(now);
            }
            match &outcome {
                Ok(value) => {
                    entry.data = Some(value.clone());
                    entry.error = None;
                    entry.updated_at = Some(now);
                    entry.invalidated = false;
                }
                Err(error) => entry.error = Some(error.clone()),
            }
        }

        match outcome {
            Ok(value) => match decode::<T>(key, value) {
                Ok(data) => QueryResult {
                    data: Some(data),
                    status: QueryStatus::Success,
                    error: None,
                    is_stale: !owns_entry && entry.invalidated,
                    is_fetching: entry.in_flight.is_some(),
                    updated_at: entry.updated_at,
                },
                Err(error) => failed(key, entry, error),
            },
            Err(error) => failed(key, entry, error),
        }
    }

    /// Current cached state of `key` without fetching.
    pub fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> QueryResult<T> {
        let entries = self.state.entries();
        match entries.get(key) {
            Some(entry) => snapshot(key, entry, &Instant::now(), &self.state.config),
            None => QueryResult::pending(),
        }
    }

    /// Run a mutation and, once it has succeeded, invalidate every filter.
    ///
    /// A failed mutation leaves the cache untouched.
    pub async fn mutate<T, Fut>(
        &self,
        mutation: Fut,
        invalidates: &[QueryFilter],
    ) -> Result<T, ResourceError>
    where
        Fut: Future<Output = Result<T, ResourceError>>,
    {
        match mutation.await {
            Ok(value) => {
                for filter in invalidates {
                    self.invalidate(filter);
                }
                Ok(value)
            }
            Err(error) => {
                warn!(%error, "mutation failed, cache left untouched");
                Err(error)
            }
        }
    }

    /// Mark matching entries stale. Returns how many entries matched.
    ///
    /// In-flight fetches are detached: readers arriving afterwards start a
    /// new fetch instead of joining one that may predate the write.
    pub fn invalidate(&self, filter: &QueryFilter) -> usize {
        let mut entries = self.state.entries();
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if filter.matches(key) {
                entry.invalidated = true;
                entry.detach_fetch();
                count += 1;
                debug!(%key, "query invalidated");
            }
        }
        count
    }

    /// Write `value` under `key` as fresh data.
    pub fn set_data<T: Serialize + ?Sized>(
        &self,
        key: &QueryKey,
        value: &T,
    ) -> Result<(), ResourceError> {
        let value = serde_json::to_value(value)
            .map_err(|e| ResourceError::invalid_payload(&key.collection, e))?;

        let mut entries = self.state.entries();
        let now = Instant::now();
        let entry = entries.entry(key.clone()).or_insert_with(|| Entry::new(now));
        entry.detach_fetch();
        entry.data = Some(value);
        entry.error = None;
        entry.updated_at = Some(now);
        entry.invalidated = false;
        if entry.observers == 0 {
            entry.idle_since = Some(now);
        }
        debug!(%key, "query data set");
        Ok(())
    }

    /// Register an active view of `key`. The entry is kept while any observer lives.
    pub fn observe(&self, key: &QueryKey) -> QueryObserver {
        let mut entries = self.state.entries();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(Instant::now()));
        entry.observers += 1;
        entry.idle_since = None;

        QueryObserver {
            state: Arc::clone(&self.state),
            key: key.clone(),
        }
    }

    /// Remove entries nobody observes, with no fetch in flight, idle for at
    /// least `gc_time`. Returns how many were removed.
    ///
    /// Expired entries are also dropped on every cache access and by a timer
    /// started when the last observer of a key goes away.
    pub fn collect_garbage(&self) -> usize {
        let mut entries = self.state.lock();
        self.state.sweep(&mut entries)
    }

    pub fn remove(&self, key: &QueryKey) -> bool {
        self.state.entries().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.state.entries().clear();
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.state.entries().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.state.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.state
            .entries()
            .get(key)
            .map(|entry| entry.in_flight.is_some())
            .unwrap_or(false)
    }

    pub fn observer_count(&self, key: &QueryKey) -> usize {
        self.state
            .entries()
            .get(key)
            .map(|entry| entry.observers)
            .unwrap_or(0)
    }
}

/// RAII registration of an active view. Dropping it starts the entry's idle clock.
pub struct QueryObserver {
    state: Arc<State>,
    key: QueryKey,
}

impl QueryObserver {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

impl Drop for QueryObserver {
    fn drop(&mut self) {
        let idle = {
            let mut entries = self.state.entries();
            match entries.get_mut(&self.key) {
                Some(entry) => {
                    entry.observers = entry.observers.saturating_sub(1);
                    if entry.observers == 0 {
                        entry.idle_since = Some(Instant::now());
                    }
                    entry.observers == 0
                }
                None => false,
            }
        };

        // Outside a runtime the entry is collected on the next cache access.
        if idle {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                let state = Arc::downgrade(&self.state);
                let gc_time = self.state.config.gc_time;
                runtime.spawn(async move {
                    tokio::time::sleep(gc_time).await;
                    if let Some(state) = state.upgrade() {
                        let mut entries = state.lock();
                        state.sweep(&mut entries);
                    }
                });
            }
        }
    }
}

fn start_fetch<T, F, Fut>(key: QueryKey, fetcher: F, config: QueryConfig) -> SharedFetch
where
    T: Serialize + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ResourceError>> + Send + 'static,
{
    async move {
        let mut attempt = 0;
        loop {
            match fetcher().await {
                Ok(value) => {
                    return serde_json::to_value(value)
                        .map_err(|e| ResourceError::invalid_payload(&key.collection, e));
                }
                Err(error) if error.is_retryable() && attempt < config.retry => {
                    attempt += 1;
                    warn!(%key, attempt, %error, "fetch failed, retrying");
                    if !config.retry_delay.is_zero() {
                        tokio::time::sleep(config.retry_delay).await;
                    }
                }
                Err(error) => {
                    warn!(%key, %error, "fetch failed");
                    return Err(error);
                }
            }
        }
    }
    .boxed()
    .shared()
}

fn decode<T: DeserializeOwned>(key: &QueryKey, value: Value) -> Result<T, ResourceError> {
    serde_json::from_value(value).map_err(|e| ResourceError::invalid_payload(&key.collection, e))
}

fn snapshot<T: DeserializeOwned>(
    key: &QueryKey,
    entry: &Entry,
    now: &Instant,
    config: &QueryConfig,
) -> QueryResult<T> {
    let data = match entry.data.clone().map(|value| decode::<T>(key, value)) {
        Some(Ok(data)) => Some(data),
        Some(Err(error)) => return failed_without_data(entry, error),
        None => None,
    };

    QueryResult {
        data,
        status: entry.status(),
        error: entry.error.clone(),
        is_stale: entry.data.is_some() && entry.is_stale(now, config),
        is_fetching: entry.in_flight.is_some(),
        updated_at: entry.updated_at,
    }
}

/// Error result that keeps whatever data the entry still holds.
fn failed<T: DeserializeOwned>(key: &QueryKey, entry: &Entry, error: ResourceError) -> QueryResult<T> {
    let data = entry
        .data
        .clone()
        .and_then(|value| decode::<T>(key, value).ok());
    QueryResult {
        is_stale: data.is_some(),
        data,
        status: QueryStatus::Error,
        error: Some(error),
        is_fetching: entry.in_flight.is_some(),
        updated_at: entry.updated_at,
    }
}

fn failed_without_data<T>(entry: &Entry, error: ResourceError) -> QueryResult<T> {
    QueryResult {
        data: None,
        status: QueryStatus::Error,
        error: Some(error),
        is_stale: false,
        is_fetching: entry.in_flight.is_some(),
        updated_at: entry.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn config() -> QueryConfig {
        QueryConfig {
            stale_time: Duration::from_secs(60),
            gc_time: Duration::from_secs(10),
            retry: 1,
            retry_delay: Duration::ZERO,
        }
    }

    fn counting(
        calls: &Arc<AtomicUsize>,
        value: u32,
    ) -> impl Fn() -> BoxFuture<'static, Result<u32, ResourceError>> + Send + Sync + 'static {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(value) }.boxed()
        }
    }

    #[tokio::test]
    async fn fresh_data_skips_fetcher() {
        let cache = QueryCache::new(config());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::list("numbers");

        let first = cache.fetch(&key, counting(&calls, 1)).await;
        let second = cache.fetch(&key, counting(&calls, 2)).await;

        assert_eq!(first.data, Some(1));
        assert_eq!(second.data, Some(1));
        assert!(second.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn data_older_than_stale_time_is_refetched() {
        let cache = QueryCache::new(config());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::list("numbers");

        let _observer = cache.observe(&key);
        cache.fetch(&key, counting(&calls, 1)).await;
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.peek::<u32>(&key).is_stale);

        let refreshed = cache.fetch(&key, counting(&calls, 2)).await;
        assert_eq!(refreshed.data, Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_reads_share_one_fetch() {
        let cache = QueryCache::new(config());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::list("numbers");

        let slow = {
            let calls = Arc::clone(&calls);
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok::<_, ResourceError>(7u32)
                }
            }
        };
        let slow_again = slow.clone();

        let (a, b) = tokio::join!(cache.fetch(&key, slow), cache.fetch(&key, slow_again));
        assert_eq!(a.data, Some(7));
        assert_eq!(b.data, Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transport_errors_are_retried() {
        let cache = QueryCache::new(config());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::list("numbers");

        let flaky = {
            let calls = Arc::clone(&calls);
            move || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Err(ResourceError::Transport("reset".into()))
                    } else {
                        Ok(3u32)
                    }
                }
            }
        };

        let result = cache.fetch(&key, flaky).await;
        assert_eq!(result.data, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let cache = QueryCache::new(config());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::detail("numbers", "x");

        let missing = {
            let calls = Arc::clone(&calls);
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<u32, _>(ResourceError::not_found("numbers", "x")) }
            }
        };

        let result = cache.fetch(&key, missing).await;
        assert!(result.is_error());
        assert!(result.error.unwrap().is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn error_keeps_previous_data() {
        let cache = QueryCache::new(QueryConfig {
            retry: 0,
            ..config()
        });
        let key = QueryKey::list("numbers");

        cache.fetch(&key, || async { Ok::<_, ResourceError>(5u32) }).await;
        cache.invalidate(&QueryFilter::Exact(key.clone()));

        let result = cache
            .fetch(&key, || async {
                Err::<u32, _>(ResourceError::Transport("offline".into()))
            })
            .await;

        assert!(result.is_error());
        assert_eq!(result.data, Some(5));
        assert!(result.is_stale);

        let peeked = cache.peek::<u32>(&key);
        assert!(peeked.is_error());
        assert_eq!(peeked.data, Some(5));
    }

    #[tokio::test]
    async fn invalidation_forces_refetch() {
        let cache = QueryCache::new(config());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::detail("numbers", "1");

        cache.fetch(&key, counting(&calls, 1)).await;
        assert_eq!(cache.invalidate(&QueryFilter::Collection("numbers".into())), 1);
        assert!(cache.peek::<u32>(&key).is_stale);

        let refetched = cache.fetch(&key, counting(&calls, 2)).await;
        assert_eq!(refetched.data, Some(2));
        assert!(!refetched.is_stale);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_cache_untouched() {
        let cache = QueryCache::new(config());
        let key = QueryKey::list("numbers");
        cache.fetch(&key, || async { Ok::<_, ResourceError>(1u32) }).await;

        let result: Result<(), _> = cache
            .mutate(
                async { Err(ResourceError::not_found("numbers", "9")) },
                &[QueryFilter::Exact(key.clone())],
            )
            .await;

        assert!(result.is_err());
        assert!(!cache.peek::<u32>(&key).is_stale);
    }

    #[tokio::test]
    async fn successful_mutation_invalidates() {
        let cache = QueryCache::new(config());
        let key = QueryKey::list("numbers");
        cache.fetch(&key, || async { Ok::<_, ResourceError>(1u32) }).await;

        let value = cache
            .mutate(async { Ok(42u32) }, &[QueryFilter::Exact(key.clone())])
            .await
            .unwrap();

        assert_eq!(value, 42);
        assert!(cache.peek::<u32>(&key).is_stale);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidation_detaches_in_flight_fetch() {
        let cache = QueryCache::new(config());
        let key = QueryKey::list("numbers");

        let before = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key, || async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok::<_, ResourceError>(1u32)
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cache.is_fetching(&key));
        cache.invalidate(&QueryFilter::Exact(key.clone()));
        assert!(!cache.is_fetching(&key));

        let after = cache.fetch(&key, || async { Ok::<_, ResourceError>(2u32) }).await;
        assert_eq!(after.data, Some(2));

        let stale_read = before.await.unwrap();
        assert_eq!(stale_read.data, Some(1));
        assert_eq!(cache.peek::<u32>(&key).data, Some(2));
    }

    #[tokio::test]
    async fn set_data_is_fresh() {
        let cache = QueryCache::new(config());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::detail("numbers", "1");

        cache.set_data(&key, &9u32).unwrap();
        let result = cache.fetch(&key, counting(&calls, 1)).await;

        assert_eq!(result.data, Some(9));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn garbage_collection_respects_observers_and_gc_time() {
        let cache = QueryCache::new(config());
        let watched = QueryKey::list("watched");
        let idle = QueryKey::list("idle");

        let observer = cache.observe(&watched);
        cache.fetch(&watched, || async { Ok::<_, ResourceError>(1u32) }).await;
        cache.fetch(&idle, || async { Ok::<_, ResourceError>(2u32) }).await;
        assert_eq!(cache.observer_count(&watched), 1);
        assert_eq!(cache.collect_garbage(), 0);

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.collect_garbage(), 1);
        assert!(!cache.contains(&idle));
        assert!(cache.contains(&watched));

        drop(observer);
        assert_eq!(cache.collect_garbage(), 0);
        assert!(cache.contains(&watched));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_entries_are_collected_without_a_manual_sweep() {
        let cache = QueryCache::new(config());
        let key = QueryKey::detail("numbers", "1");

        let observer = cache.observe(&key);
        cache.fetch(&key, || async { Ok::<_, ResourceError>(1u32) }).await;
        drop(observer);

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(cache.contains(&key));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unobserved_fetch_expires_after_gc_time() {
        let cache = QueryCache::new(config());
        let key = QueryKey::list("numbers");
        cache.fetch(&key, || async { Ok::<_, ResourceError>(1u32) }).await;

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(cache.peek::<u32>(&key).is_pending());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn peek_unknown_key_is_pending() {
        let cache = QueryCache::default();
        let result = cache.peek::<u32>(&QueryKey::list("nothing"));
        assert!(result.is_pending());
        assert!(result.data.is_none());
        assert!(result.into_result().is_none());
    }
}

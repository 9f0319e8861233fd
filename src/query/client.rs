//! Keyed cache over backend fetches.
//!
//! Each [`QueryKey`] owns one slot holding the last settled result, a
//! staleness flag, the in-flight request (if any) and a generation counter.
//! Concurrent reads of a stale key share a single request. Invalidation marks
//! the slot stale and bumps its generation; a response issued under an older
//! generation is handed to its callers but never written into the slot.
//! In-flight requests are not cancelled.
//!
//! The number of slots is capped. When a new key would exceed the cap, the
//! settled slot that was fetched least recently is dropped; slots with a
//! request in flight are never evicted.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde_json::Value;

use super::key::QueryKey;
use crate::error::{LeadflowError, Result};

/// Slots kept by [`QueryClient::new`].
pub const DEFAULT_CAPACITY: usize = 256;

type FetchOutcome = std::result::Result<Arc<Value>, Arc<LeadflowError>>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

/// Tri-state result of reading a query.
#[derive(Debug, Clone)]
pub enum QueryState<T> {
    Loading,
    Error(Arc<LeadflowError>),
    Data(T),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryState::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LeadflowError> {
        match self {
            QueryState::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        match self {
            QueryState::Loading => QueryState::Loading,
            QueryState::Error(err) => QueryState::Error(err),
            QueryState::Data(data) => QueryState::Data(f(data)),
        }
    }

    /// Like [`map`](Self::map), turning a failed conversion into the error state.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Result<U>) -> QueryState<U> {
        match self {
            QueryState::Loading => QueryState::Loading,
            QueryState::Error(err) => QueryState::Error(err),
            QueryState::Data(data) => match f(data) {
                Ok(value) => QueryState::Data(value),
                Err(err) => QueryState::Error(Arc::new(err)),
            },
        }
    }

    /// Settled result; a query that is still loading reports an error.
    pub fn into_result(self) -> Result<T> {
        match self {
            QueryState::Data(data) => Ok(data),
            QueryState::Error(err) => Err(LeadflowError::Query(err)),
            QueryState::Loading => Err(LeadflowError::Other(
                "query has not completed".to_string(),
            )),
        }
    }
}

struct Slot {
    state: QueryState<Arc<Value>>,
    stale: bool,
    generation: u64,
    in_flight: Option<SharedFetch>,
    last_used: u64,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            state: QueryState::Loading,
            stale: true,
            generation: 0,
            in_flight: None,
            last_used: 0,
        }
    }
}

impl Slot {
    fn invalidate(&mut self) {
        self.stale = true;
        self.generation += 1;
        self.in_flight = None;
    }
}

enum Lookup {
    Cached(QueryState<Arc<Value>>),
    Pending(SharedFetch, u64),
}

/// Cache of query results keyed by [`QueryKey`].
pub struct QueryClient {
    slots: DashMap<QueryKey, Slot>,
    capacity: usize,
    clock: AtomicU64,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryClient")
            .field("keys", &self.slots.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client keeping at most `capacity` settled slots (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: DashMap::new(),
            capacity: capacity.max(1),
            clock: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Last settled state of `key`; `Loading` if it was never fetched.
    pub fn state(&self, key: &QueryKey) -> QueryState<Arc<Value>> {
        self.slots
            .get(key)
            .map(|slot| slot.state.clone())
            .unwrap_or(QueryState::Loading)
    }

    /// True when the next [`fetch`](Self::fetch) of `key` will hit the backend.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.slots.get(key).map(|slot| slot.stale).unwrap_or(true)
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.slots
            .get(key)
            .map(|slot| slot.in_flight.is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Read `key`, calling `fetcher` only if the cached result is stale and no
    /// request for the key is already outstanding.
    ///
    /// A settled error is served from the cache like data; only invalidation
    /// leads to another attempt. `fetcher` runs while the key's slot is
    /// locked, so it must only build the future.
    pub async fn fetch<F, Fut>(&self, key: &QueryKey, fetcher: F) -> QueryState<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let (request, generation) = match self.lookup(key, fetcher) {
            Lookup::Cached(state) => return state,
            Lookup::Pending(request, generation) => (request, generation),
        };

        let outcome = request.await;
        self.settle(key, generation, outcome)
    }

    fn lookup<F, Fut>(&self, key: &QueryKey, fetcher: F) -> Lookup
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        if !self.slots.contains_key(key) {
            self.make_room();
        }

        let mut slot = self.slots.entry(key.clone()).or_default();
        slot.last_used = self.clock.fetch_add(1, Ordering::Relaxed);

        if !slot.stale {
            tracing::trace!(%key, "query cache hit");
            return Lookup::Cached(slot.state.clone());
        }

        if let Some(request) = &slot.in_flight {
            tracing::trace!(%key, "joining in-flight request");
            return Lookup::Pending(request.clone(), slot.generation);
        }

        let request: BoxFuture<'static, FetchOutcome> = fetcher()
            .map(|result| result.map(Arc::new).map_err(Arc::new))
            .boxed();
        let request = request.shared();
        slot.in_flight = Some(request.clone());
        tracing::debug!(%key, generation = slot.generation, "fetch started");
        Lookup::Pending(request, slot.generation)
    }

    /// Evict least recently fetched settled slots until one more key fits.
    ///
    /// Runs without holding any slot lock.
    fn make_room(&self) {
        while self.slots.len() >= self.capacity {
            let oldest = self
                .slots
                .iter()
                .filter(|entry| entry.in_flight.is_none())
                .min_by_key(|entry| entry.last_used)
                .map(|entry| entry.key().clone());
            let Some(oldest) = oldest else {
                // Every slot has a request in flight
                return;
            };
            if self
                .slots
                .remove_if(&oldest, |_, slot| slot.in_flight.is_none())
                .is_some()
            {
                tracing::trace!(key = %oldest, "evicted query slot");
            }
        }
    }

    fn settle(&self, key: &QueryKey, generation: u64, outcome: FetchOutcome) -> QueryState<Arc<Value>> {
        let state = match outcome {
            Ok(data) => QueryState::Data(data),
            Err(err) => QueryState::Error(err),
        };

        if let Some(mut slot) = self.slots.get_mut(key) {
            if slot.generation == generation {
                slot.state = state.clone();
                slot.stale = false;
                slot.in_flight = None;
            } else {
                tracing::debug!(%key, "discarding response superseded by invalidation");
            }
        }

        state
    }

    /// Mark `key` stale so the next read re-fetches it.
    ///
    /// Returns false when the key was never read.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        match self.slots.get_mut(key) {
            Some(mut slot) => {
                slot.invalidate();
                tracing::debug!(%key, "query invalidated");
                true
            }
            None => false,
        }
    }

    /// Invalidate every key matching `predicate`; returns how many matched.
    pub fn invalidate_where(&self, predicate: impl Fn(&QueryKey) -> bool) -> usize {
        let mut count = 0;
        for mut entry in self.slots.iter_mut() {
            if predicate(entry.key()) {
                entry.value_mut().invalidate();
                count += 1;
            }
        }
        if count > 0 {
            tracing::debug!(count, "queries invalidated");
        }
        count
    }

    /// Run a write and, if it succeeds, invalidate the keys that depend on it.
    ///
    /// A failed write leaves every cached result untouched.
    pub async fn mutate<T, Fut>(
        &self,
        mutation: Fut,
        dependents: impl Fn(&QueryKey) -> bool,
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        match mutation.await {
            Ok(value) => {
                self.invalidate_where(dependents);
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(error = %err, "mutation failed; cached queries left unchanged");
                Err(err)
            }
        }
    }
}

//! Batching, memoizing key-value loader
//!
//! A [`BatchLoader`] is created once per request. Every `load` call issued
//! before the loader's flush task gets to run joins the same pending batch;
//! the flush task then hands the whole ordered key list to the [`Loader`]
//! and fans the results back out to the individual futures.

use std::any::type_name;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{LoadError, LoadResult};
use crate::loader::Loader;

/// Default upper bound on the number of keys sent in one batch
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

type CacheEntry<V, E> = Shared<BoxFuture<'static, LoadResult<V, E>>>;
type Slot<V, E> = oneshot::Sender<LoadResult<V, E>>;

/// Keys collected since the last flush, one answer slot per key
///
/// `entries` mirrors the futures handed out for each key so a key whose
/// cache entry was cleared before the flush rejoins its existing slot.
struct PendingBatch<K, V, E> {
    id: u64,
    keys: Vec<K>,
    slots: Vec<Slot<V, E>>,
    entries: Vec<CacheEntry<V, E>>,
}

struct State<K, V, E> {
    cache: HashMap<K, CacheEntry<V, E>>,
    pending: Option<PendingBatch<K, V, E>>,
    next_batch_id: u64,
}

struct Inner<K, L>
where
    K: Send + Sync + Clone + 'static,
    L: Loader<K>,
{
    loader: L,
    state: Mutex<State<K, L::Value, L::Error>>,
}

/// Batching loader with a per-instance cache
///
/// Cloning is cheap and every clone shares the same cache and pending batch,
/// which is how parent entities hand their loaders down to children.
///
/// Loading requires a Tokio runtime: the first key of every batch spawns the
/// task that flushes it.
pub struct BatchLoader<K, L>
where
    K: Send + Sync + Clone + 'static,
    L: Loader<K>,
{
    inner: Arc<Inner<K, L>>,
    delay: Duration,
    max_batch_size: usize,
}

impl<K, L> Clone for BatchLoader<K, L>
where
    K: Send + Sync + Clone + 'static,
    L: Loader<K>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            delay: self.delay,
            max_batch_size: self.max_batch_size,
        }
    }
}

impl<K, L> fmt::Debug for BatchLoader<K, L>
where
    K: Send + Sync + Clone + 'static,
    L: Loader<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchLoader")
            .field("loader", &type_name::<L>())
            .field("delay", &self.delay)
            .field("max_batch_size", &self.max_batch_size)
            .finish()
    }
}

impl<K, L> BatchLoader<K, L>
where
    K: Hash + Eq + Send + Sync + Clone + 'static,
    L: Loader<K>,
{
    /// Create a loader that flushes as soon as the current task yields
    pub fn new(loader: L) -> Self {
        Self {
            inner: Arc::new(Inner {
                loader,
                state: Mutex::new(State {
                    cache: HashMap::new(),
                    pending: None,
                    next_batch_id: 0,
                }),
            }),
            delay: Duration::ZERO,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    /// Wait `delay` before flushing, widening the coalescing window
    ///
    /// Without a delay the flush task only yields once. On a multi-threaded
    /// runtime another worker may pick it up while sibling resolvers are
    /// still enqueueing, splitting their keys over several batches; a delay
    /// of a millisecond or so keeps them together.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Flush immediately once a batch holds `max_batch_size` keys
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }

    /// The wrapped fetch implementation
    pub fn loader(&self) -> &L {
        &self.inner.loader
    }

    /// Request the value for `key`
    ///
    /// The key is enqueued when this method is called, not when the returned
    /// future is first polled. A cached (or already pending) key returns the
    /// existing entry without touching the batch.
    pub fn load(&self, key: K) -> impl Future<Output = LoadResult<L::Value, L::Error>> + Send + 'static {
        let mut guard = self.inner.lock_state();
        let state = &mut *guard;

        if let Some(entry) = state.cache.get(&key) {
            return entry.clone();
        }

        // A key is never sent twice in one batch, even after `clear`
        if let Some(batch) = state.pending.as_ref() {
            if let Some(index) = batch.keys.iter().position(|pending| *pending == key) {
                let entry = batch.entries[index].clone();
                state.cache.insert(key, entry.clone());
                return entry;
            }
        }

        let (slot, answer) = oneshot::channel();
        let entry: CacheEntry<L::Value, L::Error> = answer
            .map(|received| received.unwrap_or(Err(LoadError::Dropped)))
            .boxed()
            .shared();
        state.cache.insert(key.clone(), entry.clone());

        let new_batch = match state.pending.as_mut() {
            Some(batch) => {
                batch.keys.push(key);
                batch.slots.push(slot);
                batch.entries.push(entry.clone());
                None
            }
            None => {
                let id = state.next_batch_id;
                state.next_batch_id += 1;
                state.pending = Some(PendingBatch {
                    id,
                    keys: vec![key],
                    slots: vec![slot],
                    entries: vec![entry.clone()],
                });
                Some(id)
            }
        };

        let full = state
            .pending
            .as_ref()
            .is_some_and(|batch| batch.keys.len() >= self.max_batch_size);
        let ready = if full { state.pending.take() } else { None };
        drop(guard);

        if let Some(batch) = ready {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { inner.dispatch(batch).await });
        } else if let Some(id) = new_batch {
            self.schedule_flush(id);
        }

        entry
    }

    /// Request several keys at once, answering in input order
    pub fn load_many(
        &self,
        keys: impl IntoIterator<Item = K>,
    ) -> impl Future<Output = Vec<LoadResult<L::Value, L::Error>>> + Send + 'static {
        let requests: Vec<_> = keys.into_iter().map(|key| self.load(key)).collect();
        future::join_all(requests)
    }

    /// Seed the cache with a value that is already known
    ///
    /// Returns `false` and leaves the cache untouched when the key is already
    /// cached or pending.
    pub fn prime(&self, key: K, value: L::Value) -> bool {
        let mut state = self.inner.lock_state();
        match state.cache.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(future::ready(Ok(value)).boxed().shared());
                true
            }
        }
    }

    /// Whether `key` has a cached or pending entry
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock_state().cache.contains_key(key)
    }

    /// Drop the cached entry for `key` so the next load fetches again
    ///
    /// Futures already handed out for the key still complete. A key whose
    /// batch has not been dispatched yet keeps its slot in that batch.
    pub fn clear(&self, key: &K) -> bool {
        self.inner.lock_state().cache.remove(key).is_some()
    }

    /// Drop every cached entry
    pub fn clear_all(&self) {
        self.inner.lock_state().cache.clear();
    }

    fn schedule_flush(&self, batch_id: u64) {
        let inner = Arc::clone(&self.inner);
        let delay = self.delay;
        tokio::spawn(async move {
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
            if let Some(batch) = inner.take_batch(batch_id) {
                inner.dispatch(batch).await;
            }
        });
    }
}

impl<K, L> Inner<K, L>
where
    K: Send + Sync + Clone + 'static,
    L: Loader<K>,
{
    fn lock_state(&self) -> MutexGuard<'_, State<K, L::Value, L::Error>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the pending batch if it is still the one the flush was scheduled for
    fn take_batch(&self, batch_id: u64) -> Option<PendingBatch<K, L::Value, L::Error>> {
        let mut state = self.lock_state();
        match &state.pending {
            Some(batch) if batch.id == batch_id => state.pending.take(),
            _ => None,
        }
    }

    async fn dispatch(&self, batch: PendingBatch<K, L::Value, L::Error>) {
        let PendingBatch {
            id, keys, slots, ..
        } = batch;
        let loader = type_name::<L>();

        debug!(loader, batch_id = id, batch_size = keys.len(), "Dispatching batch");

        match self.loader.load(&keys).await {
            Ok(results) if results.len() == keys.len() => {
                for (slot, result) in slots.into_iter().zip(results) {
                    // The receiver is gone when the entry was cleared and nobody awaits it
                    let _ = slot.send(result.map_err(LoadError::Fetch));
                }
            }
            Ok(results) => {
                warn!(
                    loader,
                    expected = keys.len(),
                    actual = results.len(),
                    "Loader broke the one-result-per-key contract"
                );
                let error = LoadError::LengthMismatch {
                    expected: keys.len(),
                    actual: results.len(),
                };
                for slot in slots {
                    let _ = slot.send(Err(error.clone()));
                }
            }
            Err(error) => {
                debug!(loader, batch_id = id, "Batch failed as a whole");
                for slot in slots {
                    let _ = slot.send(Err(LoadError::Batch(error.clone())));
                }
            }
        }
    }
}

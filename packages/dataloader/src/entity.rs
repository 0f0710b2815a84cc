//! Lazily resolved entities
//!
//! GraphQL selections are sparse, so an entity is built cheaply when a field
//! returns it and only loads (and converts) its backend payload the first
//! time one of its fields is read. Concurrent reads of sibling fields share
//! that single load.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::OnceCell;

/// A backend resource that can be loaded and converted into an output shape
pub trait Entity: Send + Sync {
    /// Payload returned by the backend
    type Raw: Send;

    /// Shape exposed to the GraphQL layer
    type Output: Send + Sync;

    /// Failure of either step, shared by every reader of the entity
    type Error: Clone + Send + Sync;

    /// Fetch the raw payload, typically through a request-scoped loader
    fn load(&self) -> impl Future<Output = Result<Self::Raw, Self::Error>> + Send;

    /// Reshape the raw payload; no I/O
    fn convert(&self, raw: Self::Raw) -> Result<Self::Output, Self::Error>;
}

/// Resolution progress of a [`LazyEntity`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// No field has been read yet
    Unresolved,
    /// A load is in flight; a cancelled load falls back to `Unresolved`
    Resolving,
    /// The converted output is cached
    Resolved,
    /// Loading or conversion failed; the error is cached
    Failed,
}

/// Wraps an [`Entity`] source and resolves it at most once
///
/// A failure is kept like a success: every later read returns the same
/// error instead of fetching again.
pub struct LazyEntity<S: Entity> {
    source: S,
    in_flight: AtomicBool,
    resolved: OnceCell<Result<S::Output, S::Error>>,
}

/// Marks a load as in flight until the loading future completes or is dropped
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: Entity> LazyEntity<S> {
    /// Wrap `source` without doing any work
    pub fn new(source: S) -> Self {
        Self {
            source,
            in_flight: AtomicBool::new(false),
            resolved: OnceCell::new(),
        }
    }

    /// The identifying parameters and loaders of this entity
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> EntityState {
        match self.resolved.get() {
            Some(Ok(_)) => EntityState::Resolved,
            Some(Err(_)) => EntityState::Failed,
            None if self.in_flight.load(Ordering::Acquire) => EntityState::Resolving,
            None => EntityState::Unresolved,
        }
    }

    /// Load and convert on first use, then serve the cached output
    pub async fn resolve(&self) -> Result<&S::Output, S::Error> {
        let outcome = self
            .resolved
            .get_or_init(|| async {
                let _in_flight = InFlight::enter(&self.in_flight);
                let raw = self.source.load().await?;
                self.source.convert(raw)
            })
            .await;
        outcome.as_ref().map_err(Clone::clone)
    }

    /// Resolve, then project a single field out of the output
    pub async fn get<T>(&self, field: impl FnOnce(&S::Output) -> T) -> Result<T, S::Error> {
        self.resolve().await.map(field)
    }
}

impl<S> fmt::Debug for LazyEntity<S>
where
    S: Entity + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyEntity")
            .field("source", &self.source)
            .field("state", &self.state())
            .finish()
    }
}

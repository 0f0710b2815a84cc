//! The batch fetch contract implemented by backend-specific loaders

use std::future::Future;

/// Fetches values for a batch of keys in a single call
///
/// `keys` arrive in the order they were requested and the returned vector
/// must hold exactly one slot per key, in the same order. A failure that only
/// affects one key belongs in that key's slot; returning the outer `Err`
/// fails every key of the batch.
pub trait Loader<K: Send + Sync + Clone + 'static>: Send + Sync + 'static {
    /// Value produced for one key
    type Value: Send + Sync + Clone + 'static;

    /// Error produced for one key, or for a whole batch
    type Error: Send + Sync + Clone + 'static;

    /// Load the values for `keys`
    fn load(
        &self,
        keys: &[K],
    ) -> impl Future<Output = Result<Vec<Result<Self::Value, Self::Error>>, Self::Error>> + Send;
}

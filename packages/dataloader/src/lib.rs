//! Request-scoped data loading for the commerce GraphQL bridge
//!
//! This crate provides the two mechanisms every resolver builds on:
//! - [`BatchLoader`]: collects `load` calls issued in the same scheduling
//!   window, dispatches them as one call to a [`Loader`], and memoizes the
//!   outcome per key for the lifetime of the loader (one request)
//! - [`LazyEntity`]: wraps an [`Entity`] source so that nothing is fetched
//!   until a field is read, and the load/convert step runs at most once
//!
//! # Example
//!
//! ```rust,no_run
//! use commerce_bridge_dataloader::{BatchLoader, Loader};
//!
//! struct Upper;
//!
//! impl Loader<String> for Upper {
//!     type Value = String;
//!     type Error = String;
//!
//!     async fn load(&self, keys: &[String]) -> Result<Vec<Result<String, String>>, String> {
//!         Ok(keys.iter().map(|key| Ok(key.to_uppercase())).collect())
//!     }
//! }
//!
//! # async fn example() {
//! let loader = BatchLoader::new(Upper);
//! let a = loader.load("a".to_string());
//! let b = loader.load("b".to_string());
//! // Both keys reach `Upper::load` in a single call
//! let (a, b) = futures_util::join!(a, b);
//! assert_eq!(a.unwrap(), "A");
//! assert_eq!(b.unwrap(), "B");
//! # }
//! ```

mod batch;
mod entity;
mod error;
mod key;
mod loader;

pub use batch::{BatchLoader, DEFAULT_MAX_BATCH_SIZE};
pub use entity::{Entity, EntityState, LazyEntity};
pub use error::{LoadError, LoadResult};
pub use key::JsonKey;
pub use loader::Loader;

//! Data loader error types

use thiserror::Error;

/// Outcome of a single key requested through a [`BatchLoader`](crate::BatchLoader)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError<E> {
    /// The fetch function reported a failure for this key only
    #[error("{0}")]
    Fetch(E),

    /// The fetch function failed before producing per-key results
    #[error("batch load failed: {0}")]
    Batch(E),

    /// The fetch function returned the wrong number of results
    #[error("loader returned {actual} results for {expected} keys")]
    LengthMismatch { expected: usize, actual: usize },

    /// The dispatch task ended without answering this key
    #[error("batch dispatch ended before completing")]
    Dropped,
}

impl<E> LoadError<E> {
    /// The error reported by the fetch function, if any
    pub fn inner(&self) -> Option<&E> {
        match self {
            Self::Fetch(error) | Self::Batch(error) => Some(error),
            Self::LengthMismatch { .. } | Self::Dropped => None,
        }
    }

    /// Convert the fetch error type, keeping the failure kind
    pub fn map<F>(self, op: impl FnOnce(E) -> F) -> LoadError<F> {
        match self {
            Self::Fetch(error) => LoadError::Fetch(op(error)),
            Self::Batch(error) => LoadError::Batch(op(error)),
            Self::LengthMismatch { expected, actual } => {
                LoadError::LengthMismatch { expected, actual }
            }
            Self::Dropped => LoadError::Dropped,
        }
    }
}

/// Result type for a single loaded key
pub type LoadResult<T, E> = Result<T, LoadError<E>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_displays_inner_message() {
        let err: LoadError<String> = LoadError::Fetch("cart not found".to_string());
        assert_eq!(err.to_string(), "cart not found");
    }

    #[test]
    fn test_length_mismatch_display() {
        let err: LoadError<String> = LoadError::LengthMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "loader returned 2 results for 3 keys");
    }

    #[test]
    fn test_inner_and_map() {
        let err: LoadError<&str> = LoadError::Batch("timeout");
        assert_eq!(err.inner(), Some(&"timeout"));

        let mapped = err.map(str::len);
        assert_eq!(mapped, LoadError::Batch(7));
        assert_eq!(LoadError::<String>::Dropped.inner(), None);
    }
}

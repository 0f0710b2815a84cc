//! Request-scoped loader tuning

use std::time::Duration;

use crate::{parse_env, ConfigError, ConfigResult};

/// Batching behaviour of the per-request loaders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Extra wait before a batch is flushed, in milliseconds (0 = next yield)
    pub batch_delay_ms: u64,

    /// Maximum keys per backend batch
    pub max_batch_size: usize,
}

impl LoaderConfig {
    /// Load loader configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let max_batch_size = parse_env("LOADER_MAX_BATCH_SIZE", 100)?;
        if max_batch_size == 0 {
            return Err(ConfigError::InvalidValue(
                "LOADER_MAX_BATCH_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            batch_delay_ms: parse_env("LOADER_BATCH_DELAY_MS", 1)?,
            max_batch_size,
        })
    }

    /// Flush delay as a duration
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_delay_ms: 1,
            max_batch_size: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_batch_size_is_rejected() {
        temp_env::with_var("LOADER_MAX_BATCH_SIZE", Some("0"), || {
            assert!(LoaderConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_batch_delay() {
        let config = LoaderConfig {
            batch_delay_ms: 5,
            max_batch_size: 10,
        };
        assert_eq!(config.batch_delay(), Duration::from_millis(5));
    }
}

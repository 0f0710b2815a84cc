//! API server configuration

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use commerce_bridge_shared_config::{
    BackendConfig, CommonConfig, Environment, LoaderConfig, DEFAULT_BASE_URL,
};

/// Default maximum query depth
pub const DEFAULT_DEPTH_LIMIT: usize = 12;

/// Default maximum query complexity
pub const DEFAULT_COMPLEXITY_LIMIT: usize = 500;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with other services
    pub common: CommonConfig,

    /// Server port (default: 8080)
    pub port: u16,

    /// CORS allowed origins (optional)
    pub cors_allowed_origins: Option<Vec<String>>,

    /// Maximum nesting depth of a GraphQL query
    pub graphql_depth_limit: usize,

    /// Maximum complexity score of a GraphQL query
    pub graphql_complexity_limit: usize,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// In production mode `OCC_BASE_URL` must be set explicitly; in
    /// development the local backend default is used.
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        )
        .unwrap_or_default();

        if environment.is_production() {
            Self::validate_backend_url()?;
        }

        let common = CommonConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        Ok(Self {
            common,

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT value")?,

            cors_allowed_origins: env::var("CORS_ORIGINS").ok().map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),

            graphql_depth_limit: Self::parse_limit("GRAPHQL_DEPTH_LIMIT", DEFAULT_DEPTH_LIMIT)?,

            graphql_complexity_limit: Self::parse_limit(
                "GRAPHQL_COMPLEXITY_LIMIT",
                DEFAULT_COMPLEXITY_LIMIT,
            )?,
        })
    }

    /// Validate that OCC_BASE_URL is explicitly set in production
    fn validate_backend_url() -> Result<()> {
        match env::var("OCC_BASE_URL") {
            Ok(url) if !url.is_empty() => {
                if url == DEFAULT_BASE_URL {
                    tracing::warn!("OCC_BASE_URL points at the local development backend");
                }
                Ok(())
            }
            _ => {
                bail!(
                    "OCC_BASE_URL environment variable is required in production. \
                     Please set the REST root of your commerce backend."
                );
            }
        }
    }

    /// Parse a positive query limit
    fn parse_limit(name: &str, default: usize) -> Result<usize> {
        let value = match env::var(name) {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("Invalid {} value", name))?,
            Err(_) => default,
        };
        if value == 0 {
            bail!("{} must be greater than zero", name);
        }
        Ok(value)
    }

    /// Get backend configuration
    pub fn backend(&self) -> &BackendConfig {
        &self.common.backend
    }

    /// Get loader configuration
    pub fn loader(&self) -> &LoaderConfig {
        &self.common.loader
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.common.environment.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 7] = [
        "ENVIRONMENT",
        "OCC_BASE_URL",
        "OCC_BASE_SITE",
        "PORT",
        "CORS_ORIGINS",
        "GRAPHQL_DEPTH_LIMIT",
        "GRAPHQL_COMPLEXITY_LIMIT",
    ];

    #[test]
    fn test_backend_url_required_in_production() {
        temp_env::with_vars_unset(["OCC_BASE_URL"], || {
            let result = Config::validate_backend_url();
            assert!(result.is_err());
            let err = result.unwrap_err().to_string();
            assert!(err.contains("OCC_BASE_URL"));
            assert!(err.contains("required in production"));
        });
    }

    #[test]
    fn test_empty_backend_url_fails() {
        temp_env::with_var("OCC_BASE_URL", Some(""), || {
            assert!(Config::validate_backend_url().is_err());
        });
    }

    #[test]
    fn test_backend_url_valid_when_set() {
        temp_env::with_var("OCC_BASE_URL", Some("https://shop.example.com/occ/v2"), || {
            assert!(Config::validate_backend_url().is_ok());
        });
    }

    #[test]
    fn test_production_without_backend_url_fails() {
        temp_env::with_vars_unset(VARS, || {
            temp_env::with_var("ENVIRONMENT", Some("production"), || {
                assert!(Config::from_env().is_err());
            });
        });
    }

    #[test]
    fn test_defaults_in_development() {
        temp_env::with_vars_unset(VARS, || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.port, 8080);
            assert!(config.cors_allowed_origins.is_none());
            assert_eq!(config.graphql_depth_limit, DEFAULT_DEPTH_LIMIT);
            assert_eq!(config.graphql_complexity_limit, DEFAULT_COMPLEXITY_LIMIT);
            assert_eq!(config.backend().base_url, DEFAULT_BASE_URL);
            assert!(!config.is_production());
        });
    }

    #[test]
    fn test_cors_origins_are_split_and_trimmed() {
        temp_env::with_vars_unset(VARS, || {
            temp_env::with_var(
                "CORS_ORIGINS",
                Some("https://shop.example.com, ,https://admin.example.com"),
                || {
                    let config = Config::from_env().unwrap();
                    assert_eq!(
                        config.cors_allowed_origins.unwrap(),
                        vec!["https://shop.example.com", "https://admin.example.com"]
                    );
                },
            );
        });
    }

    #[test]
    fn test_zero_depth_limit_is_rejected() {
        temp_env::with_var("GRAPHQL_DEPTH_LIMIT", Some("0"), || {
            let err = Config::parse_limit("GRAPHQL_DEPTH_LIMIT", DEFAULT_DEPTH_LIMIT)
                .unwrap_err()
                .to_string();
            assert!(err.contains("greater than zero"));
        });
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        temp_env::with_vars_unset(VARS, || {
            temp_env::with_var("PORT", Some("eighty"), || {
                assert!(Config::from_env().is_err());
            });
        });
    }
}

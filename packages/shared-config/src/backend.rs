//! Commerce backend configuration types

use url::Url;

use crate::{get_env_or_default, parse_env, ConfigError, ConfigResult};

/// Default OCC REST root, including the API version segment
pub const DEFAULT_BASE_URL: &str = "http://localhost:9002/occ/v2";

/// OCC REST API configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// REST root, e.g. `https://shop.example.com/occ/v2`
    pub base_url: String,

    /// Base site identifier used in every resource path
    pub base_site: String,

    /// Product catalog holding the category tree
    pub catalog_id: String,

    /// Catalog version exposed to shoppers
    pub catalog_version: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Retry attempts for transient failures
    pub max_retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    pub retry_base_delay_ms: u64,
}

impl BackendConfig {
    /// Load backend configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let config = Self {
            base_url: get_env_or_default("OCC_BASE_URL", DEFAULT_BASE_URL),
            base_site: get_env_or_default("OCC_BASE_SITE", "electronics"),
            catalog_id: get_env_or_default("OCC_CATALOG_ID", "electronicsProductCatalog"),
            catalog_version: get_env_or_default("OCC_CATALOG_VERSION", "Online"),
            timeout_secs: parse_env("OCC_TIMEOUT", 10)?,
            connect_timeout_secs: parse_env("OCC_CONNECT_TIMEOUT", 5)?,
            max_retries: parse_env("OCC_MAX_RETRIES", 2)?,
            retry_base_delay_ms: parse_env("OCC_RETRY_BASE_DELAY_MS", 100)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration with a custom URL (useful for testing)
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            base_url: url.into(),
            ..Self::default()
        }
    }

    /// Check that the base URL is an absolute http(s) URL
    pub fn validate(&self) -> ConfigResult<()> {
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidUrl("OCC_BASE_URL".to_string(), e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(
                "OCC_BASE_URL".to_string(),
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
        if self.base_site.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "OCC_BASE_SITE cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Full URL of a resource below the base site
    pub fn site_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.base_site,
            path.trim_start_matches('/')
        )
    }

    /// Full URL of a resource that is not scoped to a base site
    pub fn root_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            base_site: "electronics".to_string(),
            catalog_id: "electronicsProductCatalog".to_string(),
            catalog_version: "Online".to_string(),
            timeout_secs: 10,
            connect_timeout_secs: 5,
            max_retries: 2,
            retry_base_delay_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_url_joins_segments() {
        let config = BackendConfig::with_url("http://localhost:9002/occ/v2/");
        assert_eq!(
            config.site_url("/users/anonymous/carts/abc"),
            "http://localhost:9002/occ/v2/electronics/users/anonymous/carts/abc"
        );
        assert_eq!(
            config.root_url("basesites"),
            "http://localhost:9002/occ/v2/basesites"
        );
    }

    #[test]
    fn test_validate_rejects_relative_url() {
        let config = BackendConfig::with_url("occ/v2");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl(name, _)) if name == "OCC_BASE_URL"
        ));
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let config = BackendConfig::with_url("ftp://shop.example.com/occ/v2");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env_reads_overrides() {
        temp_env::with_vars(
            [
                ("OCC_BASE_URL", Some("https://shop.example.com/occ/v2")),
                ("OCC_BASE_SITE", Some("apparel-uk")),
                ("OCC_MAX_RETRIES", Some("0")),
            ],
            || {
                let config = BackendConfig::from_env().unwrap();
                assert_eq!(config.base_url, "https://shop.example.com/occ/v2");
                assert_eq!(config.base_site, "apparel-uk");
                assert_eq!(config.max_retries, 0);
            },
        );
    }
}

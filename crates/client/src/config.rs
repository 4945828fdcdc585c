//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ROSEWATER_API_URL` - Base URL of the backend (e.g., <http://localhost:4000>)
//!
//! ## Optional
//! - `ROSEWATER_CACHE_DIR` - Directory for durable client state (default: `.rosewater`)
//! - `ROSEWATER_CATALOG_RETRIES` - Retry count for catalog reads (default: 2)
//! - `ROSEWATER_RETRY_DELAY_MS` - Delay between retries in milliseconds (default: 1000)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::retry::RetryPolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend API.
    pub api_url: Url,
    /// Directory holding the durable key-value cache.
    pub cache_dir: PathBuf,
    /// Retry policy for idempotent catalog reads.
    ///
    /// Never applied to cart or order mutations, which fail fast.
    pub catalog_retry: RetryPolicy,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_required_env("ROSEWATER_API_URL")?
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("ROSEWATER_API_URL".to_string(), e.to_string()))?;

        let cache_dir = PathBuf::from(get_env_or_default("ROSEWATER_CACHE_DIR", ".rosewater"));

        let max_retries = get_env_or_default("ROSEWATER_CATALOG_RETRIES", "2")
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ROSEWATER_CATALOG_RETRIES".to_string(), e.to_string())
            })?;
        let delay_ms = get_env_or_default("ROSEWATER_RETRY_DELAY_MS", "1000")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ROSEWATER_RETRY_DELAY_MS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_url,
            cache_dir,
            catalog_retry: RetryPolicy::new(max_retries, Duration::from_millis(delay_ms)),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_construction() {
        let config = ClientConfig {
            api_url: "http://localhost:4000".parse().expect("valid url"),
            cache_dir: PathBuf::from(".rosewater"),
            catalog_retry: RetryPolicy::default(),
        };
        assert_eq!(config.api_url.as_str(), "http://localhost:4000/");
        assert_eq!(config.catalog_retry.max_retries, 2);
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let parsed = "not a url".parse::<Url>();
        assert!(parsed.is_err());
    }
}

//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `DR_API_BASE_URL` - Storefront base URL (default: `http://127.0.0.1:3000`)
//! - `DR_DATA_DIR` - Directory holding guest storage (default: `.diamant-rouge`)
//! - `DR_LOCALE` - Catalog locale (default: `fr`)
//! - `DR_PASSWORD` - Account password for non-interactive sign-in

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_DATA_DIR: &str = ".diamant-rouge";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shopper client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Storefront base URL
    pub api_base_url: Url,
    /// Directory for guest storage files
    pub data_dir: PathBuf,
    /// Catalog locale
    pub locale: String,
    /// Account password, if provided through the environment
    pub password: Option<SecretString>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `DR_API_BASE_URL` is not a valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(&get_env_or_default(
            "DR_API_BASE_URL",
            DEFAULT_API_BASE_URL,
        ))?;

        Ok(Self {
            api_base_url,
            data_dir: PathBuf::from(get_env_or_default("DR_DATA_DIR", DEFAULT_DATA_DIR)),
            locale: get_env_or_default("DR_LOCALE", diamant_rouge_core::catalog::FALLBACK_LOCALE),
            password: get_optional_env("DR_PASSWORD").map(SecretString::from),
        })
    }
}

/// Parse a base URL, making sure relative joins keep its path.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar("DR_API_BASE_URL".to_string(), e.to_string()))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("https://diamantrouge.ma/shop").unwrap();
        assert_eq!(url.join("api/cart").unwrap().path(), "/shop/api/cart");
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }
}

//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GIFTSHOP_API_BASE_URL` - Base URL of the storefront backend (e.g. `https://shop.example.in`)
//!
//! ## Optional
//! - `GIFTSHOP_ADDRESS_DATA_URL` - Location table URL (default: `<base>/addressData.json`)
//! - `GIFTSHOP_LOGIN_PATH` - Login entry point used after a session expires (default: `/login`)
//! - `GIFTSHOP_REDIRECT_DELAY_MS` - Delay before the login redirect fires (default: 1500)
//! - `GIFTSHOP_CACHE_TTL_SECS` - Lifetime of cached cart/wishlist reads (default: 300, max: one year)
//! - `GIFTSHOP_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `GIFTSHOP_API_TOKEN` - Bearer token sent with every API request
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_REDIRECT_DELAY_MS: u64 = 1500;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const ADDRESS_DATA_PATH: &str = "addressData.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend
    pub api_base_url: Url,
    /// URL of the static location table
    pub address_data_url: Url,
    /// Path the UI navigates to after a session expires
    pub login_path: String,
    /// Delay between session expiry and the login redirect
    pub redirect_delay: Duration,
    /// Time-to-live for cached reads
    pub cache_ttl: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("address_data_url", &self.address_data_url.as_str())
            .field("login_path", &self.login_path)
            .field("redirect_delay", &self.redirect_delay)
            .field("cache_ttl", &self.cache_ttl)
            .field("request_timeout", &self.request_timeout)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_dsn", &self.sentry_dsn)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration with defaults for everything but the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let api_base_url = parse_base_url("GIFTSHOP_API_BASE_URL", base_url)?;
        let address_data_url = api_base_url.join(ADDRESS_DATA_PATH).map_err(|e| {
            ConfigError::InvalidEnvVar("GIFTSHOP_API_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_base_url,
            address_data_url,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            api_token: None,
            sentry_dsn: None,
        })
    }

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

        let mut config = Self::new(&get_required_env("GIFTSHOP_API_BASE_URL")?)?;

        if let Some(raw) = get_optional_env("GIFTSHOP_ADDRESS_DATA_URL") {
            config.address_data_url = Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("GIFTSHOP_ADDRESS_DATA_URL".to_string(), e.to_string())
            })?;
        }

        config.login_path = get_env_or_default("GIFTSHOP_LOGIN_PATH", DEFAULT_LOGIN_PATH);

        config.redirect_delay = Duration::from_millis(get_u64_or_default(
            "GIFTSHOP_REDIRECT_DELAY_MS",
            DEFAULT_REDIRECT_DELAY_MS,
        )?);
        config.cache_ttl = Duration::from_secs(get_u64_or_default(
            "GIFTSHOP_CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL_SECS,
        )?);
        config.request_timeout = Duration::from_secs(get_u64_or_default(
            "GIFTSHOP_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        config.api_token = get_optional_env("GIFTSHOP_API_TOKEN").map(SecretString::from);
        config.sentry_dsn = get_optional_env("SENTRY_DSN");

        config.validate()?;
        Ok(config)
    }

    /// Check values that can't be expressed in the field types.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` naming the variable that feeds the
    /// offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.login_path.starts_with('/') {
            return Err(ConfigError::InvalidEnvVar(
                "GIFTSHOP_LOGIN_PATH".to_string(),
                "must start with '/'".to_string(),
            ));
        }
        if self.cache_ttl > Duration::from_secs(MAX_CACHE_TTL_SECS) {
            return Err(ConfigError::InvalidEnvVar(
                "GIFTSHOP_CACHE_TTL_SECS".to_string(),
                format!("must be at most {MAX_CACHE_TTL_SECS} seconds"),
            ));
        }
        Ok(())
    }

    /// Resolve an API path (e.g. `api/cart`) against the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.api_base_url.join(path.trim_start_matches('/'))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, forcing a trailing slash so relative joins keep any path prefix.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }

    Ok(url)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a numeric environment variable with a default value.
fn get_u64_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_defaults() {
        let config = ClientConfig::new("https://shop.example.in").unwrap();
        assert_eq!(config.api_base_url.as_str(), "https://shop.example.in/");
        assert_eq!(
            config.address_data_url.as_str(),
            "https://shop.example.in/addressData.json"
        );
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.redirect_delay, Duration::from_millis(1500));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let config = ClientConfig::new("http://localhost:8080/shop").unwrap();
        assert_eq!(
            config.endpoint("/api/cart").unwrap().as_str(),
            "http://localhost:8080/shop/api/cart"
        );
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = ClientConfig::new("ftp://shop.example.in").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        assert!(ClientConfig::new("not a url").is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut config = ClientConfig::new("https://shop.example.in").unwrap();
        config.api_token = Some(SecretString::from("super_secret_token_value"));

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("shop.example.in"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token_value"));
    }

    #[test]
    fn test_validate_rejects_oversized_cache_ttl() {
        let mut config = ClientConfig::new("https://shop.example.in").unwrap();
        assert!(config.validate().is_ok());

        config.cache_ttl = Duration::from_secs(MAX_CACHE_TTL_SECS);
        assert!(config.validate().is_ok());

        config.cache_ttl = Duration::from_secs(99_999_999_999);
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "GIFTSHOP_CACHE_TTL_SECS")
        );
    }

    #[test]
    fn test_validate_rejects_relative_login_path() {
        let mut config = ClientConfig::new("https://shop.example.in").unwrap();
        config.login_path = "login".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_u64_default_when_unset() {
        assert_eq!(
            get_u64_or_default("GIFTSHOP_TEST_SURELY_UNSET_VAR", 42).unwrap(),
            42
        );
    }
}

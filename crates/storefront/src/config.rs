//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_BACKEND_URL` - Base URL of the REST backend (falls back to
//!   `BACKEND_URL`, then `http://localhost:8001`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Fraction of error events to send (default: 1.0)

use thiserror::Error;
use url::Url;

/// Backend URL used when no environment variable is set.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// REST backend base URL
    pub backend_url: Url,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g., production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let (key, raw) = get_optional_env("STOREFRONT_BACKEND_URL")
            .map(|v| ("STOREFRONT_BACKEND_URL", v))
            .or_else(|| get_optional_env("BACKEND_URL").map(|v| ("BACKEND_URL", v)))
            .unwrap_or(("STOREFRONT_BACKEND_URL", DEFAULT_BACKEND_URL.to_string()));
        let backend_url = parse_backend_url(&raw)
            .map_err(|reason| ConfigError::InvalidEnvVar(key.to_string(), reason))?;

        let sentry_sample_rate = match get_optional_env("SENTRY_SAMPLE_RATE") {
            Some(raw) => parse_sample_rate(&raw).map_err(|reason| {
                ConfigError::InvalidEnvVar("SENTRY_SAMPLE_RATE".to_string(), reason)
            })?,
            None => 1.0,
        };

        Ok(Self {
            backend_url,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
        })
    }

    /// Replace the backend URL (e.g., from a command line flag).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is not a valid http(s) URL.
    pub fn with_backend_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.backend_url = parse_backend_url(raw)
            .map_err(|reason| ConfigError::InvalidEnvVar("--backend-url".to_string(), reason))?;
        Ok(self)
    }

    /// Configuration pointing at `backend_url` with error tracking disabled.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is not a valid http(s) URL.
    pub fn for_backend(raw: &str) -> Result<Self, ConfigError> {
        let backend_url = parse_backend_url(raw)
            .map_err(|reason| ConfigError::InvalidEnvVar("backend_url".to_string(), reason))?;
        Ok(Self {
            backend_url,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse and validate the backend base URL.
///
/// Only `http` and `https` are accepted and the URL must not carry a query or
/// fragment, since endpoint paths are appended to it.
fn parse_backend_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("must not contain a query or fragment".to_string());
    }

    Ok(url)
}

fn parse_sample_rate(raw: &str) -> Result<f32, String> {
    let rate = raw.trim().parse::<f32>().map_err(|e| e.to_string())?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(format!("must be between 0 and 1 (got {rate})"));
    }
    Ok(rate)
}

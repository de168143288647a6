//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RINDHOUSE_CART_API_URL` - Base URL of the remote cart resource
//! - `RINDHOUSE_CART_API_TOKEN` - API access token for the cart resource
//!
//! ## Optional
//! - `RINDHOUSE_CART_STORE_PATH` - Local persisted cart file
//!   (default: `rindhouse-cart.json`)
//! - `RINDHOUSE_CATALOG_PATH` - Static catalog JSON file

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_API_TOKEN_LENGTH: usize = 16;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote cart resource configuration
    pub remote_cart: RemoteCartConfig,
    /// Path of the local persisted cart copy
    pub cart_store_path: PathBuf,
    /// Path of the static catalog JSON file, if any
    pub catalog_path: Option<PathBuf>,
}

/// Remote cart resource configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct RemoteCartConfig {
    /// Base URL of the cart REST resource
    pub base_url: Url,
    /// API access token, sent as a bearer credential
    pub api_token: SecretString,
}

impl std::fmt::Debug for RemoteCartConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCartConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the API token fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let remote_cart = RemoteCartConfig::from_env()?;
        let cart_store_path =
            PathBuf::from(get_env_or_default("RINDHOUSE_CART_STORE_PATH", "rindhouse-cart.json"));
        let catalog_path = get_optional_env("RINDHOUSE_CATALOG_PATH").map(PathBuf::from);

        Ok(Self {
            remote_cart,
            cart_store_path,
            catalog_path,
        })
    }
}

impl RemoteCartConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("RINDHOUSE_CART_API_URL")?;
        let base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("RINDHOUSE_CART_API_URL".to_string(), e.to_string())
        })?;

        let api_token = get_required_env("RINDHOUSE_CART_API_TOKEN").map(SecretString::from)?;
        validate_api_token(&api_token, "RINDHOUSE_CART_API_TOKEN")?;

        Ok(Self {
            base_url,
            api_token,
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

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that an API token meets minimum length requirements.
fn validate_api_token(token: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = token.expose_secret();
    if value.len() < MIN_API_TOKEN_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_API_TOKEN_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

//! Message service configuration.
//!
//! Configuration is loaded from environment variables. Token validation
//! settings are read by `shared_auth::AuthConfig` from the same variables.

use common::config::ConfigError as CommonConfigError;
pub use common::config::{CorsOrigins, LogFormat};
use shared_auth::config::ConfigError as AuthConfigError;
use shared_auth::AuthConfig;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default allowed CORS origins.
pub const DEFAULT_CORS_ORIGINS: &str = "*";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Service(#[from] CommonConfigError),

    #[error(transparent)]
    Auth(#[from] AuthConfigError),
}

/// Message service configuration.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Allowed CORS origins, from a comma separated list or "*" (default).
    pub cors_origins: CorsOrigins,

    /// Log output format (default: text).
    pub log_format: LogFormat,

    /// Token validation settings.
    pub auth: AuthConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("cors_origins", &self.cors_origins)
            .field("log_format", &self.log_format)
            .field("jwks_url", &self.auth.jwks_url)
            .field("issuer", &self.auth.issuer)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let cors_origins = vars
            .get("CORS_ORIGINS")
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CORS_ORIGINS)
            .parse::<CorsOrigins>()?;

        let log_format = match vars.get("LOG_FORMAT") {
            Some(value) => value.parse::<LogFormat>()?,
            None => LogFormat::default(),
        };

        let auth = AuthConfig::from_vars(vars)?;

        Ok(Config {
            bind_address,
            cors_origins,
            log_format,
            auth,
        })
    }
}

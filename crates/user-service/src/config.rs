//! User service configuration.
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
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Default allowed CORS origins.
pub const DEFAULT_CORS_ORIGINS: &str = "*";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Service(#[from] CommonConfigError),

    #[error(transparent)]
    Auth(#[from] AuthConfigError),
}

/// User service configuration.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8081").
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

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([(
            "JWKS_URL".to_string(),
            "https://idp.example/.well-known/jwks.json".to_string(),
        )])
    }

    #[test]
    fn test_from_vars_defaults() {
        let config = Config::from_vars(&base_vars()).unwrap();

        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.cors_origins, CorsOrigins::Any);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(
            config.auth.jwks_url,
            "https://idp.example/.well-known/jwks.json"
        );
        assert!(config.auth.issuer.is_none());
    }

    #[test]
    fn test_from_vars_overrides() {
        let mut vars = base_vars();
        vars.insert("BIND_ADDRESS".to_string(), "127.0.0.1:9090".to_string());
        vars.insert(
            "CORS_ORIGINS".to_string(),
            "https://board.example".to_string(),
        );
        vars.insert("LOG_FORMAT".to_string(), "JSON".to_string());
        vars.insert("JWT_ISSUER".to_string(), "https://issuer.example".to_string());

        let config = Config::from_vars(&vars).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:9090");
        assert_eq!(
            config.cors_origins,
            CorsOrigins::List(vec![HeaderValue::from_static("https://board.example")])
        );
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.auth.issuer.as_deref(), Some("https://issuer.example"));
    }

    #[test]
    fn test_from_vars_invalid_log_format() {
        let mut vars = base_vars();
        vars.insert("LOG_FORMAT".to_string(), "xml".to_string());

        let result = Config::from_vars(&vars);

        assert!(matches!(
            result,
            Err(ConfigError::Service(CommonConfigError::InvalidLogFormat(ref v))) if v == "xml"
        ));
    }

    #[test]
    fn test_from_vars_cors_list_with_wildcard_allows_any() {
        let mut vars = base_vars();
        vars.insert(
            "CORS_ORIGINS".to_string(),
            "https://board.example, *".to_string(),
        );

        let config = Config::from_vars(&vars).unwrap();

        assert_eq!(config.cors_origins, CorsOrigins::Any);
    }

    #[test]
    fn test_from_vars_invalid_cors_origin() {
        let mut vars = base_vars();
        vars.insert(
            "CORS_ORIGINS".to_string(),
            "https://board.example,bad\nvalue".to_string(),
        );

        let result = Config::from_vars(&vars);

        assert!(matches!(
            result,
            Err(ConfigError::Service(CommonConfigError::InvalidCorsOrigin(_)))
        ));
    }

    #[test]
    fn test_from_vars_cognito_pool() {
        let vars = HashMap::from([
            (
                "COGNITO_USER_POOL_ID".to_string(),
                "eu-central-1_Users".to_string(),
            ),
            ("AWS_REGION".to_string(), "eu-central-1".to_string()),
        ]);

        let config = Config::from_vars(&vars).unwrap();

        assert_eq!(
            config.auth.jwks_url,
            "https://cognito-idp.eu-central-1.amazonaws.com/eu-central-1_Users/.well-known/jwks.json"
        );
        assert_eq!(
            config.auth.issuer.as_deref(),
            Some("https://cognito-idp.eu-central-1.amazonaws.com/eu-central-1_Users")
        );
    }

    #[test]
    fn test_from_vars_requires_key_source() {
        let result = Config::from_vars(&HashMap::new());

        assert!(matches!(
            result,
            Err(ConfigError::Auth(AuthConfigError::MissingEnvVar(_)))
        ));
    }
}

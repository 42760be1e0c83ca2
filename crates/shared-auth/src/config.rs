//! Token validator configuration.
//!
//! Loaded from environment variables by the services. Either point at a JWKS
//! URL directly, or give a Cognito user pool and let the URL and issuer be
//! derived from it.
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `JWKS_URL` | Key set URL. Takes precedence over the pool variables. |
//! | `JWT_ISSUER` | Required `iss`. Unset or empty skips the issuer check. |
//! | `COGNITO_USER_POOL_ID` | Pool to derive URL and issuer from. |
//! | `COGNITO_REGION` | Pool region; falls back to `AWS_REGION`, then `us-east-1`. |
//! | `JWKS_CACHE_TTL_SECONDS` | Optional maximum age of cached keys. Unset = never expire. |

use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Region used when neither `COGNITO_REGION` nor `AWS_REGION` is set.
pub const DEFAULT_COGNITO_REGION: &str = "us-east-1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWKS cache TTL configuration: {0}")]
    InvalidCacheTtl(String),
}

/// Configuration for one `JwtValidator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// URL of the provider's published key set.
    pub jwks_url: String,

    /// Required `iss` claim. `None` skips the issuer check.
    pub issuer: Option<String>,

    /// Maximum age of cached keys. `None` keeps them for the process lifetime.
    pub cache_max_age: Option<Duration>,
}

impl AuthConfig {
    /// Configuration for an explicit JWKS URL and optional issuer.
    ///
    /// An empty issuer is the same as no issuer: the check is skipped.
    pub fn new(jwks_url: impl Into<String>, issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();
        Self {
            jwks_url: jwks_url.into(),
            issuer: (!issuer.is_empty()).then_some(issuer),
            cache_max_age: None,
        }
    }

    /// Configuration for a Cognito user pool.
    pub fn cognito(region: &str, user_pool_id: &str) -> Self {
        let issuer = format!("https://cognito-idp.{}.amazonaws.com/{}", region, user_pool_id);
        Self::new(format!("{}/.well-known/jwks.json", issuer), issuer)
    }

    /// Set a maximum age for cached keys.
    pub fn with_cache_max_age(mut self, max_age: Duration) -> Self {
        self.cache_max_age = Some(max_age);
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        let config = if let Some(jwks_url) = non_empty("JWKS_URL") {
            Self::new(jwks_url, non_empty("JWT_ISSUER").unwrap_or_default())
        } else if let Some(pool_id) = non_empty("COGNITO_USER_POOL_ID") {
            let region = non_empty("COGNITO_REGION")
                .or_else(|| non_empty("AWS_REGION"))
                .unwrap_or_else(|| {
                    tracing::warn!(
                        target: "auth.config",
                        region = DEFAULT_COGNITO_REGION,
                        "COGNITO_REGION and AWS_REGION not set, using default region"
                    );
                    DEFAULT_COGNITO_REGION.to_string()
                });
            Self::cognito(&region, &pool_id)
        } else {
            return Err(ConfigError::MissingEnvVar(
                "JWKS_URL or COGNITO_USER_POOL_ID".to_string(),
            ));
        };

        let config = match vars.get("JWKS_CACHE_TTL_SECONDS") {
            Some(value_str) => {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidCacheTtl(format!(
                        "JWKS_CACHE_TTL_SECONDS must be a valid positive integer, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value == 0 {
                    return Err(ConfigError::InvalidCacheTtl(
                        "JWKS_CACHE_TTL_SECONDS must be greater than 0".to_string(),
                    ));
                }

                config.with_cache_max_age(Duration::from_secs(value))
            }
            None => config,
        };

        Ok(config)
    }
}

//! Key-set fetcher for the identity provider's JWKS endpoint.
//!
//! The provider publishes its current RSA signing keys at a well-known URL.
//! This module fetches and parses that document. It does not cache anything:
//! caching happens one level up, per converted key, in [`super::cache`].
//!
//! # Failure handling
//!
//! - Transport failures (including the request timeout) -> `JwksError::Transport`
//! - Any status other than `200 OK` -> `JwksError::Status`
//! - A body that is not a JSON key set -> `JwksError::Decode`
//!
//! There is no retry. A failed fetch fails the token being validated and the
//! next request that misses the cache tries again.

use crate::observability::metrics;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::instrument;

/// Default request timeout for JWKS fetches, in seconds.
///
/// An unresponsive identity provider must not stall request workers.
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 5;

/// Errors produced while fetching the key set.
#[derive(Debug, Error)]
pub enum JwksError {
    /// Connection, TLS, or timeout failure.
    #[error("failed to fetch JWKS: {0}")]
    Transport(#[source] reqwest::Error),

    /// The endpoint answered with something other than 200.
    #[error("JWKS endpoint returned status {0}")]
    Status(u16),

    /// The body was not a JSON key set.
    #[error("failed to decode JWKS: {0}")]
    Decode(#[source] serde_json::Error),
}

/// One published signing key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Jwk {
    /// Key type (the provider publishes "RSA").
    #[serde(default)]
    pub kty: String,

    /// Key ID, unique within one key set. Empty when the record has none,
    /// which no token can select.
    #[serde(default)]
    pub kid: String,

    /// Advisory key use (normally "sig").
    #[serde(default, rename = "use")]
    pub key_use: String,

    /// Advisory algorithm, when the provider includes it.
    #[serde(default)]
    pub alg: Option<String>,

    /// RSA modulus, base64url without padding.
    #[serde(default)]
    pub n: String,

    /// RSA public exponent, base64url without padding.
    #[serde(default)]
    pub e: String,
}

/// The key set document: `{"keys": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Find the record whose `kid` matches exactly.
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|key| key.kid == kid)
    }
}

/// Source of the provider's key set.
///
/// Production uses [`HttpKeySetSource`]. Tests inject stubs to count fetches
/// or simulate provider failures.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    /// Fetch the full, current key set.
    async fn fetch_key_set(&self) -> Result<JwkSet, JwksError>;
}

/// Fetches the key set over HTTPS with reqwest.
pub struct HttpKeySetSource {
    jwks_url: String,
    http_client: reqwest::Client,
}

impl HttpKeySetSource {
    /// Create a source for `jwks_url` with the default timeout.
    pub fn new(jwks_url: String) -> Self {
        Self::with_timeout(jwks_url, Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECONDS))
    }

    /// Create a source with a custom request timeout.
    pub fn with_timeout(jwks_url: String, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "auth.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
        }
    }

    /// The configured JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    #[instrument(skip_all, fields(url = %self.jwks_url))]
    async fn fetch_key_set(&self) -> Result<JwkSet, JwksError> {
        tracing::debug!(target: "auth.jwks", "Fetching JWKS");
        let started = Instant::now();

        let result = self.fetch_inner().await;

        let status = match &result {
            Ok(_) => "success",
            Err(JwksError::Transport(_)) => "transport_error",
            Err(JwksError::Status(_)) => "bad_status",
            Err(JwksError::Decode(_)) => "decode_error",
        };
        metrics::record_jwks_fetch(status, started.elapsed());

        result
    }
}

impl HttpKeySetSource {
    async fn fetch_inner(&self) -> Result<JwkSet, JwksError> {
        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "auth.jwks", error = %e, "Failed to fetch JWKS");
                JwksError::Transport(e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::error!(target: "auth.jwks", status = %status, "JWKS endpoint returned error");
            return Err(JwksError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::error!(target: "auth.jwks", error = %e, "Failed to read JWKS body");
            JwksError::Transport(e)
        })?;

        let key_set: JwkSet = serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(target: "auth.jwks", error = %e, "Failed to parse JWKS response");
            JwksError::Decode(e)
        })?;

        tracing::info!(
            target: "auth.jwks",
            key_count = key_set.keys.len(),
            "JWKS fetched"
        );

        Ok(key_set)
    }
}

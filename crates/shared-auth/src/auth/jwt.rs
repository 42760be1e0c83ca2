//! Access token validation.
//!
//! Validates bearer tokens issued by the identity provider against the keys
//! it publishes at its JWKS endpoint.
//!
//! # Pipeline
//!
//! Each step short-circuits on failure:
//!
//! 1. Size check and unverified parse of header and payload, to learn `kid`
//! 2. Key resolution: cache lookup, else fetch the key set, pick the exact
//!    `kid`, convert, and cache
//! 3. Algorithm allow-list (RS256/RS384/RS512), then signature verification
//! 4. Claim policy: `token_use == "access"`, `iss` if configured, `exp` strictly
//!    in the future
//!
//! # Security
//!
//! - Nothing from step 1 is trusted beyond choosing the key
//! - An unknown `kid` is terminal; there is no fallback to other keys
//! - Symmetric or unsigned algorithms never reach the key
//! - Every failure is distinct here for logging, and collapsed into one
//!   generic 401 by the middleware

use crate::auth::cache::KeyCache;
use crate::auth::claims::{numeric_claim, string_claim, VerifiedClaims};
use crate::auth::jwks::{HttpKeySetSource, JwksError, KeySetSource};
use crate::auth::keys::{convert_jwk, KeyConversionError, PublicKeyMaterial};
use crate::config::AuthConfig;
use crate::observability::metrics;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, Algorithm, Validation};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Maximum accepted token size in bytes (8KB).
///
/// Larger tokens are rejected before any base64 or JSON decoding.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// The only `token_use` value accepted on protected routes.
pub const EXPECTED_TOKEN_USE: &str = "access";

/// Failures fetching or converting the key for a token.
#[derive(Debug, Error)]
pub enum KeyResolutionError {
    #[error(transparent)]
    Fetch(#[from] JwksError),

    #[error(transparent)]
    Convert(#[from] KeyConversionError),
}

/// Why a token was rejected.
///
/// Display strings are for server-side logs only; clients always see the
/// same generic message.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token exceeds {max} bytes", max = MAX_JWT_SIZE_BYTES)]
    TokenTooLarge,

    #[error("malformed token: {0}")]
    Malformed(&'static str),

    #[error("no published key with kid '{0}'")]
    UnknownKey(String),

    #[error("key resolution failed: {0}")]
    KeyResolution(#[source] KeyResolutionError),

    #[error("algorithm '{0}' is not allowed")]
    DisallowedAlgorithm(String),

    #[error("signature verification failed")]
    InvalidSignature,

    #[error("token_use is not '{expected}'", expected = EXPECTED_TOKEN_USE)]
    InvalidTokenUse,

    #[error("issuer does not match")]
    InvalidIssuer,

    #[error("token has no numeric exp claim")]
    MissingExpiry,

    #[error("token has expired")]
    Expired,
}

impl TokenError {
    /// Bounded label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::TokenTooLarge => "too_large",
            TokenError::Malformed(_) => "malformed",
            TokenError::UnknownKey(_) => "unknown_key",
            TokenError::KeyResolution(_) => "key_resolution",
            TokenError::DisallowedAlgorithm(_) => "disallowed_algorithm",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::InvalidTokenUse => "invalid_token_use",
            TokenError::InvalidIssuer => "invalid_issuer",
            TokenError::MissingExpiry => "missing_expiry",
            TokenError::Expired => "expired",
        }
    }
}

impl From<KeyResolutionError> for TokenError {
    fn from(err: KeyResolutionError) -> Self {
        TokenError::KeyResolution(err)
    }
}

/// Header fields of a token that has not been verified yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnverifiedHeader {
    pub kid: String,
    pub alg: String,
}

/// Decode the header and payload without checking the signature.
///
/// Only used to find the verification key. The payload is decoded to make
/// sure the token is structurally sound, and then discarded.
///
/// # Errors
///
/// - `TokenError::TokenTooLarge` - token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `TokenError::Malformed` - not three parts, bad base64url or JSON, or the
///   header lacks a non-empty string `kid` or a string `alg`
pub fn parse_unverified(token: &str) -> Result<UnverifiedHeader, TokenError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "auth.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(TokenError::TokenTooLarge);
    }

    let mut parts = token.split('.');
    let (Some(header_part), Some(payload_part), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed("expected three dot-separated parts"));
    };

    let header = decode_json_object(header_part).ok_or(TokenError::Malformed("bad header"))?;
    decode_json_object(payload_part).ok_or(TokenError::Malformed("bad payload"))?;

    let kid = string_claim(&header, "kid")
        .filter(|kid| !kid.is_empty())
        .ok_or(TokenError::Malformed("missing kid"))?;
    let alg = string_claim(&header, "alg").ok_or(TokenError::Malformed("missing alg"))?;

    Ok(UnverifiedHeader { kid, alg })
}

fn decode_json_object(part: &str) -> Option<Map<String, Value>> {
    let bytes = URL_SAFE_NO_PAD.decode(part).ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Map a declared `alg` onto the allowed RSA PKCS#1 v1.5 algorithms.
pub fn allowed_algorithm(alg: &str) -> Option<Algorithm> {
    match alg {
        "RS256" => Some(Algorithm::RS256),
        "RS384" => Some(Algorithm::RS384),
        "RS512" => Some(Algorithm::RS512),
        _ => None,
    }
}

/// Check `exp` against an explicit `now`: valid only while `now < exp`.
pub fn check_expiry_at(exp: f64, now: i64) -> Result<(), TokenError> {
    // i64 -> f64 is exact for any realistic Unix timestamp
    #[allow(clippy::cast_precision_loss)]
    let now = now as f64;
    if now >= exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}

/// Validates access tokens against the provider's JWKS.
///
/// Holds its own key cache; create one per configuration and share it via `Arc`.
pub struct JwtValidator {
    key_source: Arc<dyn KeySetSource>,
    cache: KeyCache,
    issuer: Option<String>,
}

impl JwtValidator {
    /// Create a validator that fetches keys over HTTPS.
    pub fn new(config: &AuthConfig) -> Self {
        let source = Arc::new(HttpKeySetSource::new(config.jwks_url.clone()));
        Self::with_source(config, source)
    }

    /// Create a validator with a custom key source.
    pub fn with_source(config: &AuthConfig, key_source: Arc<dyn KeySetSource>) -> Self {
        let cache = match config.cache_max_age {
            Some(max_age) => KeyCache::with_max_age(max_age),
            None => KeyCache::new(),
        };

        Self {
            key_source,
            cache,
            issuer: config.issuer.clone(),
        }
    }

    /// Create a validator for a Cognito user pool.
    pub fn cognito(region: &str, user_pool_id: &str) -> Self {
        Self::new(&AuthConfig::cognito(region, user_pool_id))
    }

    /// Required issuer, if any.
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// The validator's key cache.
    pub fn cache(&self) -> &KeyCache {
        &self.cache
    }

    /// Validate a token against the current time.
    ///
    /// # Errors
    ///
    /// Returns the `TokenError` of the first pipeline step that fails.
    #[instrument(skip_all)]
    pub async fn validate(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        self.validate_at(token, chrono::Utc::now().timestamp()).await
    }

    /// Validate a token against an explicit `now` (Unix epoch seconds).
    ///
    /// Prefer [`JwtValidator::validate`] in production code; this variant lets
    /// expiry boundaries be tested without wall-clock dependence.
    ///
    /// # Errors
    ///
    /// Returns the `TokenError` of the first pipeline step that fails.
    pub async fn validate_at(&self, token: &str, now: i64) -> Result<VerifiedClaims, TokenError> {
        let result = self.run_pipeline(token, now).await;

        match &result {
            Ok(_) => {
                tracing::debug!(target: "auth.jwt", "Token validated successfully");
                metrics::record_token_validation("success");
            }
            Err(e) => {
                tracing::debug!(target: "auth.jwt", error = %e, kind = e.kind(), "Token rejected");
                metrics::record_token_validation(e.kind());
            }
        }

        result
    }

    async fn run_pipeline(&self, token: &str, now: i64) -> Result<VerifiedClaims, TokenError> {
        // 1. Unverified parse, only to find the key
        let header = parse_unverified(token)?;

        // 2. Key resolution
        let key = self.resolve_key(&header.kid).await?;

        // 3. Algorithm restriction, then signature
        let algorithm = allowed_algorithm(&header.alg).ok_or_else(|| {
            tracing::warn!(target: "auth.jwt", alg = %header.alg, "Token declares disallowed algorithm");
            TokenError::DisallowedAlgorithm(header.alg.clone())
        })?;
        let payload = verify_signature(token, algorithm, &key)?;

        // 4. Claim policy
        check_claim_policy(payload, self.issuer.as_deref(), now)
    }

    async fn resolve_key(&self, kid: &str) -> Result<Arc<PublicKeyMaterial>, TokenError> {
        if let Some(key) = self.cache.lookup(kid).await {
            return Ok(key);
        }

        let key_set = self
            .key_source
            .fetch_key_set()
            .await
            .map_err(KeyResolutionError::from)?;

        let jwk = key_set.find(kid).ok_or_else(|| {
            tracing::warn!(
                target: "auth.jwt",
                kid = %kid,
                published_keys = key_set.keys.len(),
                "Key not found in JWKS"
            );
            TokenError::UnknownKey(kid.to_string())
        })?;

        let material = convert_jwk(jwk).map_err(|e| {
            tracing::error!(target: "auth.jwt", kid = %kid, error = %e, "Failed to convert published key");
            KeyResolutionError::from(e)
        })?;

        Ok(self.cache.store(kid, material).await)
    }
}

/// Verify the signature and return the payload.
///
/// jsonwebtoken's own time and audience checks are disabled; the claim
/// policy is applied separately with zero leeway.
fn verify_signature(
    token: &str,
    algorithm: Algorithm,
    key: &PublicKeyMaterial,
) -> Result<Map<String, Value>, TokenError> {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.required_spec_claims.clear();

    let token_data =
        decode::<Map<String, Value>>(token, key.decoding_key(), &validation).map_err(|e| {
            tracing::debug!(target: "auth.jwt", error = %e, "Token verification failed");
            TokenError::InvalidSignature
        })?;

    Ok(token_data.claims)
}

fn check_claim_policy(
    payload: Map<String, Value>,
    expected_issuer: Option<&str>,
    now: i64,
) -> Result<VerifiedClaims, TokenError> {
    let token_use = string_claim(&payload, "token_use")
        .filter(|token_use| token_use == EXPECTED_TOKEN_USE)
        .ok_or(TokenError::InvalidTokenUse)?;

    if let Some(expected) = expected_issuer {
        if string_claim(&payload, "iss").as_deref() != Some(expected) {
            return Err(TokenError::InvalidIssuer);
        }
    }

    let exp = numeric_claim(&payload, "exp").ok_or(TokenError::MissingExpiry)?;
    check_expiry_at(exp, now)?;

    #[allow(clippy::cast_possible_truncation)]
    let exp = exp as i64;
    Ok(VerifiedClaims::from_verified_payload(payload, token_use, exp))
}

//! Builder patterns for test data construction
//!
//! Provides a fluent API for access token claims shaped like the identity
//! provider's.

use crate::crypto_fixtures::TestKey;
use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};

/// Issuer used by tests that configure one.
pub const TEST_ISSUER: &str = "https://idp.test.example/pool_Test123";

/// Builder for access token claims
///
/// Defaults to a valid access token for `test-subject` expiring in an hour,
/// with no `iss`.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_user("alice")
///     .with_email("alice@example.com")
///     .expires_at(1_700_000_060)
///     .sign_with(&TEST_KEY_1);
/// ```
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    pub fn new() -> Self {
        let now = Utc::now();
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!("test-subject"));
        claims.insert("token_use".to_string(), json!("access"));
        claims.insert("iat".to_string(), json!(now.timestamp()));
        claims.insert(
            "exp".to_string(),
            json!((now + Duration::seconds(3600)).timestamp()),
        );
        Self { claims }
    }

    /// Set `sub` and `username`
    pub fn for_user(self, username: &str) -> Self {
        self.with_claim("sub", json!(format!("sub-{}", username)))
            .with_claim("username", json!(username))
    }

    pub fn with_email(self, email: &str) -> Self {
        self.with_claim("email", json!(email))
    }

    pub fn issued_by(self, issuer: &str) -> Self {
        self.with_claim("iss", json!(issuer))
    }

    pub fn with_token_use(self, token_use: &str) -> Self {
        self.with_claim("token_use", json!(token_use))
    }

    /// Set expiration in seconds from now (negative for already expired)
    pub fn expires_in(self, seconds: i64) -> Self {
        self.expires_at((Utc::now() + Duration::seconds(seconds)).timestamp())
    }

    /// Set an absolute expiration timestamp
    pub fn expires_at(self, timestamp: i64) -> Self {
        self.with_claim("exp", json!(timestamp))
    }

    /// Set any claim, replacing an existing one
    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Remove a claim
    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    /// Build the claims as a JSON value
    pub fn build(self) -> Value {
        Value::Object(self.claims)
    }

    /// Build and sign with RS256 under the key's `kid`
    pub fn sign_with(self, key: &TestKey) -> String {
        key.sign_token(&self.build())
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_valid_access_token() {
        let claims = TestTokenBuilder::new().build();

        assert_eq!(claims["token_use"], "access");
        assert_eq!(claims["sub"], "test-subject");
        assert!(claims["exp"].as_i64().unwrap() > Utc::now().timestamp());
        assert!(claims.get("iss").is_none());
    }

    #[test]
    fn test_builder_identity_fields() {
        let claims = TestTokenBuilder::new()
            .for_user("alice")
            .with_email("alice@example.com")
            .issued_by(TEST_ISSUER)
            .build();

        assert_eq!(claims["sub"], "sub-alice");
        assert_eq!(claims["username"], "alice");
        assert_eq!(claims["email"], "alice@example.com");
        assert_eq!(claims["iss"], TEST_ISSUER);
    }

    #[test]
    fn test_builder_without_claim() {
        let claims = TestTokenBuilder::new().without_claim("exp").build();
        assert!(claims.get("exp").is_none());
    }

    #[test]
    fn test_builder_expires_at() {
        let claims = TestTokenBuilder::new().expires_at(42).build();
        assert_eq!(claims["exp"], 42);
    }
}

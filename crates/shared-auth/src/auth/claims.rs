//! Verified token claims.
//!
//! The provider's payload is an open JSON object. Rather than pass that map
//! around, each claim the services care about has an extraction function that
//! returns `None` when the claim is absent or has the wrong JSON type, and the
//! results are assembled into [`VerifiedClaims`]. The full map stays available
//! through [`VerifiedClaims::raw`] for provider-specific fields.
//!
//! Identity fields are redacted in Debug output so claims can be logged.

use secrecy::SecretString;
use serde_json::{Map, Value};
use std::fmt;

/// A string claim, if present and a JSON string.
pub fn string_claim(claims: &Map<String, Value>, name: &str) -> Option<String> {
    claims
        .get(name)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

/// A numeric claim, if present and a JSON number.
pub fn numeric_claim(claims: &Map<String, Value>, name: &str) -> Option<f64> {
    claims.get(name).and_then(Value::as_f64)
}

/// The `email` claim.
pub fn user_email(claims: &Map<String, Value>) -> Option<String> {
    string_claim(claims, "email")
}

/// The `username` claim.
pub fn username(claims: &Map<String, Value>) -> Option<String> {
    string_claim(claims, "username")
}

/// The `sub` claim (the provider's stable user ID).
pub fn user_sub(claims: &Map<String, Value>) -> Option<String> {
    string_claim(claims, "sub")
}

/// Payload of a token that passed signature and policy checks.
#[derive(Clone)]
pub struct VerifiedClaims {
    /// `iss`, when the token carries one.
    pub issuer: Option<String>,

    /// `exp`, Unix epoch seconds.
    pub exp: i64,

    /// `token_use`; always "access" once verified.
    pub token_use: String,

    /// `sub` - redacted in Debug output.
    pub sub: Option<String>,

    /// `email` - redacted in Debug output.
    pub email: Option<String>,

    /// `username` - redacted in Debug output.
    pub username: Option<String>,

    raw: Map<String, Value>,
}

impl VerifiedClaims {
    /// Assemble from a verified payload whose policy claims were already checked.
    pub(crate) fn from_verified_payload(raw: Map<String, Value>, token_use: String, exp: i64) -> Self {
        Self {
            issuer: string_claim(&raw, "iss"),
            exp,
            token_use,
            sub: user_sub(&raw),
            email: user_email(&raw),
            username: username(&raw),
            raw,
        }
    }

    /// Any claim by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    /// The full claim map.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }
}

impl fmt::Debug for VerifiedClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("VerifiedClaims")
            .field("issuer", &self.issuer)
            .field("exp", &self.exp)
            .field("token_use", &self.token_use)
            .field("sub", &redact(&self.sub))
            .field("email", &redact(&self.email))
            .field("username", &redact(&self.username))
            .field("raw", &format_args!("[{} claims]", self.raw.len()))
            .finish()
    }
}

/// Identity attached to a request by the auth middleware.
///
/// Handlers read this from request extensions instead of re-validating.
#[derive(Clone)]
pub struct AuthContext {
    /// The verified claims (`jwt_claims`).
    pub claims: VerifiedClaims,

    /// The raw bearer token (`access_token`), for calls back to the provider.
    pub access_token: SecretString,

    pub user_email: Option<String>,
    pub username: Option<String>,
    pub user_sub: Option<String>,
}

impl AuthContext {
    pub fn new(claims: VerifiedClaims, access_token: &str) -> Self {
        Self {
            user_email: claims.email.clone(),
            username: claims.username.clone(),
            user_sub: claims.sub.clone(),
            access_token: SecretString::from(access_token),
            claims,
        }
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("claims", &self.claims)
            .field("access_token", &"[REDACTED]")
            .field("user_email", &self.user_email.is_some())
            .field("username", &self.username.is_some())
            .field("user_sub", &self.user_sub.is_some())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_string_claim_present_and_absent() {
        let claims = payload(json!({"email": "alice@example.com"}));

        assert_eq!(
            string_claim(&claims, "email").as_deref(),
            Some("alice@example.com")
        );
        assert!(string_claim(&claims, "username").is_none());
    }

    #[test]
    fn test_string_claim_wrong_type_is_absent() {
        let claims = payload(json!({"sub": 42, "email": null, "username": ["bob"]}));

        assert!(user_sub(&claims).is_none());
        assert!(user_email(&claims).is_none());
        assert!(username(&claims).is_none());
    }

    #[test]
    fn test_numeric_claim_accepts_integer_and_float() {
        let claims = payload(json!({"exp": 1700000000, "nbf": 1700000000.5, "iss": "x"}));

        assert_eq!(numeric_claim(&claims, "exp"), Some(1_700_000_000.0));
        assert_eq!(numeric_claim(&claims, "nbf"), Some(1_700_000_000.5));
        assert!(numeric_claim(&claims, "iss").is_none());
        assert!(numeric_claim(&claims, "missing").is_none());
    }

    #[test]
    fn test_from_verified_payload_extracts_identity() {
        let raw = payload(json!({
            "iss": "https://issuer.example",
            "sub": "user-123",
            "username": "alice",
            "email": "alice@example.com",
            "client_id": "web-app",
        }));

        let claims = VerifiedClaims::from_verified_payload(raw, "access".to_string(), 1_700_000_000);

        assert_eq!(claims.issuer.as_deref(), Some("https://issuer.example"));
        assert_eq!(claims.sub.as_deref(), Some("user-123"));
        assert_eq!(claims.username.as_deref(), Some("alice"));
        assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
        assert_eq!(claims.get("client_id"), Some(&json!("web-app")));
        assert_eq!(claims.raw().len(), 5);
    }

    #[test]
    fn test_claims_debug_redacts_identity() {
        let raw = payload(json!({"sub": "secret-user-id", "email": "alice@example.com"}));
        let claims = VerifiedClaims::from_verified_payload(raw, "access".to_string(), 1);

        let debug_str = format!("{:?}", claims);

        assert!(!debug_str.contains("secret-user-id"));
        assert!(!debug_str.contains("alice@example.com"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_auth_context_copies_convenience_fields() {
        let raw = payload(json!({"sub": "user-123", "username": "alice"}));
        let claims = VerifiedClaims::from_verified_payload(raw, "access".to_string(), 1);

        let ctx = AuthContext::new(claims, "raw.jwt.token");

        assert_eq!(ctx.user_sub.as_deref(), Some("user-123"));
        assert_eq!(ctx.username.as_deref(), Some("alice"));
        assert!(ctx.user_email.is_none());
        assert_eq!(ctx.access_token.expose_secret(), "raw.jwt.token");
        let debug_str = format!("{:?}", ctx);
        assert!(!debug_str.contains("raw.jwt.token"));
        assert!(!debug_str.contains("user-123"));
    }
}

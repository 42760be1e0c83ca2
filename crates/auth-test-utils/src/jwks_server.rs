//! Mock JWKS endpoint
//!
//! Wraps a wiremock server that serves `GET /.well-known/jwks.json`.

use crate::crypto_fixtures::{jwks_json, TestKey};
use serde_json::Value;
use shared_auth::AuthConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// A running mock JWKS endpoint.
///
/// # Example
/// ```rust,ignore
/// let jwks = MockJwksServer::start(&[TEST_KEY_1]).await;
/// let validator = JwtValidator::new(&jwks.auth_config(""));
/// ```
pub struct MockJwksServer {
    server: MockServer,
}

impl MockJwksServer {
    /// Serve a key set built from `keys`.
    pub async fn start(keys: &[TestKey]) -> Self {
        Self::start_with_body(jwks_json(keys)).await
    }

    /// Serve an arbitrary JSON body with status 200.
    pub async fn start_with_body(body: Value) -> Self {
        Self::start_with_response(ResponseTemplate::new(200).set_body_json(body)).await
    }

    /// Answer every JWKS request with `status` and an empty body.
    pub async fn start_with_status(status: u16) -> Self {
        Self::start_with_response(ResponseTemplate::new(status)).await
    }

    pub async fn start_with_response(response: ResponseTemplate) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(response)
            .mount(&server)
            .await;
        Self { server }
    }

    pub fn jwks_url(&self) -> String {
        format!("{}{}", self.server.uri(), JWKS_PATH)
    }

    /// Validator configuration pointing at this server. Empty issuer skips the check.
    pub fn auth_config(&self, issuer: &str) -> AuthConfig {
        AuthConfig::new(self.jwks_url(), issuer)
    }

    /// Number of requests the server has received.
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }

    pub fn inner(&self) -> &MockServer {
        &self.server
    }
}

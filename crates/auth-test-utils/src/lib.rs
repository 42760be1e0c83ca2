//! # Auth Test Utilities
//!
//! Shared test utilities for the token validator and the services using it.
//!
//! This crate provides:
//! - Deterministic RSA fixtures (fixed keys for reproducible tests)
//! - `TestTokenBuilder` for access token claims
//! - `MockJwksServer`, a wiremock-backed JWKS endpoint
//! - In-process key sources that count or fail fetches
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let jwks = MockJwksServer::start(&[TEST_KEY_1]).await;
//!     let validator = JwtValidator::new(&jwks.auth_config(TEST_ISSUER));
//!
//!     let token = TestTokenBuilder::new()
//!         .for_user("alice")
//!         .issued_by(TEST_ISSUER)
//!         .sign_with(&TEST_KEY_1);
//!
//!     assert!(validator.validate(&token).await.is_ok());
//! }
//! ```

pub mod crypto_fixtures;
pub mod jwks_server;
pub mod key_sources;
pub mod token_builders;

// Re-export commonly used items
pub use crypto_fixtures::*;
pub use jwks_server::*;
pub use key_sources::*;
pub use token_builders::*;

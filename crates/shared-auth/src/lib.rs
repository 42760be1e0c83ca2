//! Shared authentication for the message board services.
//!
//! Both the message service and the user service gate their protected routes
//! on access tokens issued by a managed identity provider. This crate holds
//! everything needed to do that:
//!
//! - `auth::jwks` - fetch the provider's published key set
//! - `auth::keys` - turn a published RSA key into verification material
//! - `auth::cache` - per-validator cache of converted keys
//! - `auth::jwt` - the token verification pipeline
//! - `auth::claims` - typed view over a verified payload
//! - `middleware` - axum request gate for protected routes
//! - `config` - validator configuration from the environment
//!
//! # Request flow
//!
//! ```text
//! request -> require_auth -> JwtValidator::validate
//!                                 |-- parse_unverified (kid, alg)
//!                                 |-- KeyCache::lookup -> KeySetSource::fetch_key_set -> convert_jwk
//!                                 |-- signature verification (RS256/384/512 only)
//!                                 `-- token_use / iss / exp policy
//! ```

pub mod auth;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod observability;

pub use auth::{AuthContext, JwtValidator, VerifiedClaims};
pub use config::AuthConfig;
pub use errors::AuthError;
pub use middleware::{require_auth, AuthState, ClaimsExt};

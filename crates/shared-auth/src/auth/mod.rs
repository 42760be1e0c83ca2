//! Access token validation against the identity provider's JWKS.
//!
//! # Components
//!
//! - `jwks` - key-set fetcher and the `KeySetSource` seam
//! - `keys` - JWK to RSA public key conversion
//! - `cache` - key ID to converted key cache
//! - `jwt` - validator pipeline and its error taxonomy
//! - `claims` - verified claims and per-claim extraction

pub mod cache;
pub mod claims;
pub mod jwks;
pub mod jwt;
pub mod keys;

pub use cache::KeyCache;
pub use claims::{AuthContext, VerifiedClaims};
pub use jwks::{HttpKeySetSource, Jwk, JwkSet, JwksError, KeySetSource};
pub use jwt::{
    parse_unverified, JwtValidator, KeyResolutionError, TokenError, UnverifiedHeader,
    EXPECTED_TOKEN_USE, MAX_JWT_SIZE_BYTES,
};
pub use keys::{convert_jwk, KeyConversionError, PublicKeyMaterial};

//! Current user handler.
//!
//! Returns the caller's profile as asserted by the verified access token.

use axum::Json;
use secrecy::ExposeSecret;
use serde::Serialize;
use shared_auth::AuthContext;
use tracing::instrument;

/// Response for `/users/me`.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Always "access" for requests that got this far.
    pub token_use: String,

    /// Token expiration timestamp.
    pub exp: i64,

    /// Whether the raw token was forwarded to the handler.
    pub has_access_token: bool,
}

impl From<AuthContext> for MeResponse {
    fn from(ctx: AuthContext) -> Self {
        Self {
            has_access_token: !ctx.access_token.expose_secret().is_empty(),
            token_use: ctx.claims.token_use,
            exp: ctx.claims.exp,
            sub: ctx.user_sub,
            username: ctx.username,
            email: ctx.user_email,
        }
    }
}

/// Handler for GET /users/me
///
/// Requires the auth middleware.
///
/// ```json
/// {
///   "sub": "0f6a...",
///   "username": "alice",
///   "email": "alice@example.com",
///   "token_use": "access",
///   "exp": 1700003600,
///   "has_access_token": true
/// }
/// ```
#[instrument(skip_all, name = "user.handlers.me")]
pub async fn get_me(ctx: AuthContext) -> Json<MeResponse> {
    tracing::debug!(target: "user.handlers.me", "Returning caller profile");
    Json(MeResponse::from(ctx))
}

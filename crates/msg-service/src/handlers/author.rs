//! Message author handler.
//!
//! Reports the identity a message posted with the caller's token would be
//! attributed to.

use axum::Json;
use serde::Serialize;
use shared_auth::AuthContext;
use tracing::instrument;

/// Shown when a token carries no usable identity claim.
pub const ANONYMOUS_AUTHOR: &str = "anonymous";

/// Response for `/messages/author`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorResponse {
    /// Display name: `username`, else `email`, else `sub`.
    pub author: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<AuthContext> for AuthorResponse {
    fn from(ctx: AuthContext) -> Self {
        let author = ctx
            .username
            .clone()
            .or_else(|| ctx.user_email.clone())
            .or_else(|| ctx.user_sub.clone())
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string());

        Self {
            author,
            sub: ctx.user_sub,
            username: ctx.username,
            email: ctx.user_email,
        }
    }
}

/// Handler for GET /messages/author
///
/// Requires the auth middleware.
///
/// ```json
/// {
///   "author": "alice",
///   "sub": "0f6a...",
///   "username": "alice",
///   "email": "alice@example.com"
/// }
/// ```
#[instrument(skip_all, name = "msg.handlers.author")]
pub async fn get_author(ctx: AuthContext) -> Json<AuthorResponse> {
    tracing::debug!(target: "msg.handlers.author", "Returning message author identity");
    Json(AuthorResponse::from(ctx))
}

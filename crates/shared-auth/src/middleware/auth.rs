//! Authentication middleware for protected routes.
//!
//! Extracts the bearer token from the Authorization header, validates it,
//! and injects an [`AuthContext`] into request extensions.

use crate::auth::{AuthContext, JwtValidator};
use crate::errors::AuthError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

const BEARER_PREFIX: &str = "Bearer ";

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub jwt_validator: Arc<JwtValidator>,
}

impl AuthState {
    pub fn new(jwt_validator: Arc<JwtValidator>) -> Self {
        Self { jwt_validator }
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// The prefix is case-sensitive with exactly one space and is matched on the
/// raw header bytes. A token that is not UTF-8 can never verify and is
/// rejected as an invalid token.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers.get(header::AUTHORIZATION).ok_or_else(|| {
        tracing::debug!(target: "auth.middleware", "Missing Authorization header");
        AuthError::MissingAuthorizationHeader
    })?;

    let token = auth_header
        .as_bytes()
        .strip_prefix(BEARER_PREFIX.as_bytes())
        .ok_or_else(|| {
            tracing::debug!(target: "auth.middleware", "Invalid Authorization header format");
            AuthError::InvalidAuthorizationScheme
        })?;

    if token.is_empty() {
        tracing::debug!(target: "auth.middleware", "Empty bearer token");
        return Err(AuthError::MissingToken);
    }

    std::str::from_utf8(token).map_err(|_| {
        tracing::warn!(target: "auth.middleware", "Bearer token is not valid UTF-8");
        AuthError::InvalidToken
    })
}

/// Authentication middleware.
///
/// Use with `axum::middleware::from_fn_with_state`.
///
/// # Authorization Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Response
///
/// - 401 with a JSON error body if the header is missing, malformed, or the
///   token fails validation; the wrapped handler is not called
/// - Otherwise continues with an `AuthContext` in request extensions
#[instrument(skip_all, name = "auth.middleware.require_auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AuthError> {
    let token = extract_bearer_token(req.headers())?;

    let claims = match state.jwt_validator.validate(token).await {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(
                target: "auth.middleware",
                error = %e,
                kind = e.kind(),
                "Rejected bearer token"
            );
            return Err(AuthError::InvalidToken);
        }
    };

    let context = AuthContext::new(claims, token);
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

/// Extracts the `AuthContext` placed by [`require_auth`].
///
/// Rejects with 401 if the route is not behind the middleware.
#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthContext>().cloned().ok_or_else(|| {
            tracing::error!(
                target: "auth.middleware",
                "AuthContext requested on a route without require_auth"
            );
            AuthError::MissingAuthorizationHeader
        })
    }
}

/// Extension trait for reading the auth context from a request.
pub trait ClaimsExt {
    /// `None` if the auth middleware was not applied to this request.
    fn auth_context(&self) -> Option<&AuthContext>;
}

impl<B> ClaimsExt for axum::http::Request<B> {
    fn auth_context(&self) -> Option<&AuthContext> {
        self.extensions().get::<AuthContext>()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    // Validation paths need a JWKS endpoint and live in tests/middleware_tests.rs.

    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static [u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(value).unwrap(),
        );
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        let headers = headers_with(b"Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            extract_bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingAuthorizationHeader)
        );
    }

    #[test]
    fn test_non_utf8_token_is_invalid_token() {
        let headers = headers_with(b"Bearer \xfftoken");
        assert_eq!(extract_bearer_token(&headers), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_non_ascii_header_with_wrong_scheme() {
        let headers = headers_with(b"Basic \xff");
        assert_eq!(
            extract_bearer_token(&headers),
            Err(AuthError::InvalidAuthorizationScheme)
        );
    }

    #[test]
    fn test_utf8_non_ascii_token_is_passed_through() {
        // The validator rejects it later as malformed.
        let headers = headers_with("Bearer t\u{f6}ken".as_bytes());
        assert_eq!(extract_bearer_token(&headers).unwrap(), "t\u{f6}ken");
    }

    #[test]
    fn test_wrong_scheme() {
        for value in [
            &b"Basic xyz"[..],
            b"bearer abc",
            b"BEARER abc",
            b"Bearer",
            b"Bearerabc",
            b"",
        ] {
            let mut headers = HeaderMap::new();
            headers.insert(
                header::AUTHORIZATION,
                HeaderValue::from_bytes(value).unwrap(),
            );
            assert_eq!(
                extract_bearer_token(&headers),
                Err(AuthError::InvalidAuthorizationScheme),
                "value {:?}",
                String::from_utf8_lossy(value)
            );
        }
    }

    #[test]
    fn test_empty_token() {
        let headers = headers_with(b"Bearer ");
        assert_eq!(extract_bearer_token(&headers), Err(AuthError::MissingToken));
    }

    #[test]
    fn test_token_keeps_extra_whitespace() {
        // Only the single-space prefix is stripped; the rest is the token.
        let headers = headers_with(b"Bearer  abc");
        assert_eq!(extract_bearer_token(&headers).unwrap(), " abc");
    }

    #[test]
    fn test_auth_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AuthState>();
    }
}

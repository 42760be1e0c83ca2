//! HTTP-facing errors of the auth middleware.
//!
//! Every variant renders as 401 Unauthorized with a `{"error": "..."}` body
//! and a `WWW-Authenticate` challenge. Validator failures all map to
//! [`AuthError::InvalidToken`], whose message is deliberately generic.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Challenge sent with every 401.
pub const WWW_AUTHENTICATE_CHALLENGE: &str = "Bearer error=\"invalid_token\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is required")]
    MissingAuthorizationHeader,

    #[error("Authorization header must start with 'Bearer '")]
    InvalidAuthorizationScheme,

    #[error("Token is required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };

        let mut response = (self.status_code(), Json(body)).into_response();
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static(WWW_AUTHENTICATE_CHALLENGE),
        );

        response
    }
}

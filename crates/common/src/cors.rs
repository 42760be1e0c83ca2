//! Cross-origin policy for the service routers.

use crate::config::CorsOrigins;
use axum::http::{header, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Build the CORS layer for `origins`, allowing `methods`.
///
/// Allowed request headers are `Origin`, `Content-Type` and `Authorization`.
pub fn cors_layer<I>(origins: &CorsOrigins, methods: I) -> CorsLayer
where
    I: IntoIterator<Item = Method>,
{
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::any(),
        CorsOrigins::List(list) => AllowOrigin::list(list.iter().cloned()),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(methods.into_iter().collect::<Vec<_>>())
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
}

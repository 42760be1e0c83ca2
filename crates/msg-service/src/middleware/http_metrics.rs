//! HTTP metrics middleware
//!
//! Applied as the outermost layer so rejected requests (401 from the auth
//! middleware, 404, 405) are counted too.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::observability::metrics::record_http_request;

pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    record_http_request(&method, &path, response.status().as_u16(), start.elapsed());

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn test_app() -> Router {
        Router::new()
            .route("/health", get(|| async { "OK" }))
            .layer(middleware::from_fn(http_metrics_middleware))
    }

    #[tokio::test]
    async fn test_middleware_passes_response_through() {
        let request = HttpRequest::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request builder should succeed");

        let response = test_app()
            .oneshot(request)
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_sees_not_found() {
        let request = HttpRequest::builder()
            .uri("/missing")
            .body(Body::empty())
            .expect("request builder should succeed");

        let response = test_app()
            .oneshot(request)
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

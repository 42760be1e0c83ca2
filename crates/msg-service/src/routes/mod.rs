//! HTTP routes for the message service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use axum::{http::Method, middleware, routing::get, Router};
use common::cors::cors_layer;
use metrics_exporter_prometheus::PrometheusHandle;
use shared_auth::{require_auth, AuthState, JwtValidator};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Methods answered in CORS preflight.
pub const CORS_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::OPTIONS];

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Liveness probe - public
/// - `/metrics` - Prometheus metrics endpoint - public
/// - `/messages/author` - Caller's author identity - requires authentication
/// - CORS from `CORS_ORIGINS`
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let jwt_validator = Arc::new(JwtValidator::new(&state.config.auth));
    let auth_state = Arc::new(AuthState::new(jwt_validator));

    let public_routes = Router::new().route("/health", get(handlers::health_check));

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/messages/author", get(handlers::get_author))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. CorsLayer - Answer preflight before auth
    // 4. http_metrics_middleware - Record ALL responses (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins, CORS_METHODS))
        .layer(middleware::from_fn(http_metrics_middleware))
}

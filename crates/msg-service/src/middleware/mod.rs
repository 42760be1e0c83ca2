//! HTTP middleware for the message service.
//!
//! Authentication comes from `shared_auth::require_auth`.

pub mod http_metrics;

pub use http_metrics::http_metrics_middleware;

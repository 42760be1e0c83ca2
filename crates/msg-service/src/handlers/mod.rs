//! HTTP request handlers.

mod author;
mod health;
mod metrics;

pub use author::{get_author, AuthorResponse};
pub use health::{health_check, HealthResponse};
pub use metrics::metrics_handler;

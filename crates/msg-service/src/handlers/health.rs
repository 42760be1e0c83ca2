//! Liveness probe.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Handler for GET /health
///
/// Always `{"status": "ok"}` while the process is serving.
#[tracing::instrument(skip_all, name = "msg.health.check")]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

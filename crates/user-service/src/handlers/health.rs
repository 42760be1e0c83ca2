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
#[tracing::instrument(skip_all, name = "user.health.check")]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_is_ok() {
        let Json(response) = health_check().await;
        assert_eq!(serde_json::to_value(response).unwrap(), serde_json::json!({"status": "ok"}));
    }
}

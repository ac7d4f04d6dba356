//! System endpoints: liveness check.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `true` while the process is responsive.
    pub is_success: bool,
}

/// `GET /health` — Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns `{\"is_success\": true}` while the relay is responsive.",
    responses(
        (status = 200, description = "Relay is alive", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { is_success: true }))
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::config::RelayConfig;

    #[tokio::test]
    async fn health_returns_literal_success_body() {
        let app = routes().with_state(AppState::new(&RelayConfig::default()));
        let Ok(request) = Request::builder().uri("/health").body(Body::empty()) else {
            panic!("valid request");
        };

        let Ok(response) = app.oneshot(request).await else {
            panic!("router is infallible");
        };
        assert_eq!(response.status(), StatusCode::OK);

        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body should be readable");
        };
        assert_eq!(bytes.as_ref(), br#"{"is_success":true}"#);
    }
}

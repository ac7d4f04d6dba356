//! HTTP API layer: plain HTTP routes and their OpenAPI document.

pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for the plain HTTP endpoints.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "broadcast-relay", description = "WebSocket broadcast relay"),
    paths(handlers::system::health_handler),
    components(schemas(handlers::system::HealthResponse)),
    tags((name = "System", description = "Liveness"))
)]
pub struct ApiDoc;

/// Builds the router with all plain HTTP endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new().merge(handlers::system::routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_health() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/health"));
    }
}

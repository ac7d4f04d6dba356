//! Router composition and the serve loop with bounded graceful shutdown.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::error::RelayError;
use crate::ws::handler::ws_handler;

/// Builds the full application router: `/ws`, `/health` and, with the
/// `swagger-ui` feature, the API docs.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the relay on `listener` until `state.shutdown` is cancelled.
///
/// On shutdown the listener stops accepting, every open connection is
/// asked to close (each one unregisters itself as it goes), and the call
/// waits up to `grace` for connection tasks to finish. Connections still
/// open after that are left to be dropped with the process.
///
/// # Errors
///
/// Returns [`RelayError::Io`] if the HTTP server fails.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    grace: Duration,
) -> Result<(), RelayError> {
    let shutdown = state.shutdown.clone();
    let tasks = state.tasks.clone();
    let registry = Arc::clone(state.registry());

    let app = build_router(state).into_make_service_with_connect_info::<SocketAddr>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();
    let mut server = tokio::spawn(server);

    tokio::select! {
        result = &mut server => {
            shutdown.cancel();
            return flatten(result);
        }
        () = shutdown.cancelled() => {}
    }

    tracing::info!(connections = registry.len(), "shutting down, closing connections");
    tasks.close();

    let drained = tokio::time::timeout(grace, async {
        let result = (&mut server).await;
        tasks.wait().await;
        result
    })
    .await;

    match drained {
        Ok(result) => {
            flatten(result)?;
            tracing::info!("all connections closed");
        }
        Err(_) => {
            server.abort();
            tracing::info!(
                remaining = registry.len(),
                grace_secs = grace.as_secs(),
                "grace period elapsed, force-closing remaining connections"
            );
        }
    }
    Ok(())
}

fn flatten(result: Result<std::io::Result<()>, JoinError>) -> Result<(), RelayError> {
    match result {
        Ok(io_result) => io_result.map_err(RelayError::from),
        Err(err) => Err(RelayError::Io(std::io::Error::other(err))),
    }
}

//! Axum WebSocket upgrade handler.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::error::RelayError;

/// `GET /ws` — Upgrade HTTP connection to WebSocket.
///
/// The upgrade is refused when the request is not a valid WebSocket
/// handshake, when the origin policy rejects the `Origin` header (a
/// missing header counts as the empty origin), when the relay is shutting
/// down, or when the connection limit is reached. A refused handshake
/// creates no connection and leaves the registry untouched.
///
/// # Errors
///
/// Returns [`RelayError`] describing why the handshake was refused.
pub async fn ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Response, RelayError> {
    let ws = ws.map_err(|rejection| RelayError::HandshakeRejected {
        status: rejection.status(),
        reason: rejection.body_text(),
    })?;

    let origin = match headers.get(header::ORIGIN) {
        None => "",
        Some(value) => value
            .to_str()
            .map_err(|_| RelayError::OriginRejected("<non-utf8>".to_string()))?,
    };
    if !state.origin_policy.is_allowed(origin) {
        tracing::warn!(%remote_addr, origin, "origin rejected");
        return Err(RelayError::OriginRejected(origin.to_string()));
    }

    if state.shutdown.is_cancelled() {
        return Err(RelayError::ShuttingDown);
    }

    let limits = state.limits;
    let connections = state.relay.registry().len();
    if connections >= limits.max_connections {
        tracing::warn!(%remote_addr, connections, "connection limit reached");
        return Err(RelayError::CapacityExceeded {
            limit: limits.max_connections,
        });
    }

    let relay = Arc::clone(&state.relay);
    let shutdown = state.shutdown.clone();
    let tracker = state.tasks.clone();

    Ok(ws
        .max_message_size(limits.max_message_bytes)
        .on_failed_upgrade(move |err| {
            tracing::warn!(%remote_addr, error = %err, "websocket upgrade failed");
        })
        .on_upgrade(move |socket| {
            tracker.track_future(run_connection(
                socket,
                remote_addr,
                relay,
                limits.outbound_queue_capacity,
                shutdown,
            ))
        })
        .into_response())
}

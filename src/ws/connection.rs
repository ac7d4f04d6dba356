//! WebSocket connection loop.
//!
//! Drives one upgraded socket: a writer task drains the connection's
//! outbound queue into the socket while the read loop hands every inbound
//! text or binary frame to the [`ConnectionHandler`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::{CloseReason, Connection, ConnectionHandler, RelayMessage};

/// How long the writer may take to flush a close frame once the read side
/// has finished.
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs the lifecycle of a single upgraded WebSocket.
///
/// Calls `on_open` before the first read, `on_message` for each text or
/// binary frame in arrival order, and `on_close` exactly once when the
/// client disconnects, the socket fails, or the connection is closed from
/// the server side (including cancellation of `shutdown`).
pub async fn run_connection<H: ConnectionHandler>(
    socket: WebSocket,
    remote_addr: SocketAddr,
    handler: Arc<H>,
    outbound_capacity: usize,
    shutdown: CancellationToken,
) {
    let (conn, outbound_rx) = Connection::new(remote_addr, outbound_capacity, &shutdown);
    let (ws_tx, mut ws_rx) = socket.split();

    handler.on_open(&conn);

    let mut writer = tokio::spawn(write_loop(ws_tx, outbound_rx, conn.clone()));
    let mut writer_finished = false;

    let reason = loop {
        tokio::select! {
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Close(_))) | None => break CloseReason::Client,
                    Some(Ok(frame)) => {
                        if let Some(message) = RelayMessage::from_frame(frame) {
                            handler.on_message(&conn, message);
                        }
                    }
                    Some(Err(err)) => break CloseReason::Transport(err.to_string()),
                }
            }
            result = &mut writer => {
                writer_finished = true;
                break match result {
                    Ok(Ok(())) => CloseReason::Server,
                    Ok(Err(err)) => CloseReason::Transport(err.to_string()),
                    Err(err) => CloseReason::Transport(err.to_string()),
                };
            }
            () = conn.closed() => break CloseReason::Server,
        }
    };

    conn.close();
    handler.on_close(&conn, reason);

    if !writer_finished && tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, &mut writer).await.is_err() {
        tracing::debug!(conn_id = %conn.id(), "close frame not flushed in time");
        writer.abort();
    }
}

/// Forwards queued messages to the socket until the connection is closed,
/// then sends a close frame.
async fn write_loop(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<RelayMessage>,
    conn: Connection,
) -> Result<(), axum::Error> {
    loop {
        tokio::select! {
            msg = outbound_rx.recv() => {
                match msg {
                    Some(msg) => ws_tx.send(msg.into()).await?,
                    None => break,
                }
            }
            () = conn.closed() => break,
        }
    }
    // The peer may already be gone.
    let _ = ws_tx.send(Message::Close(None)).await;
    Ok(())
}

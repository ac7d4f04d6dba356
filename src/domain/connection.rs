//! Handle to one accepted WebSocket session.
//!
//! A [`Connection`] is shared between the transport loop that owns the
//! socket (see [`crate::ws::connection`]) and the
//! [`super::ConnectionRegistry`] that tracks it for broadcast. Writers never
//! touch the socket directly: they push onto a bounded outbound queue that
//! the transport loop drains.

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use super::{ConnectionId, RelayMessage};
use crate::error::RelayError;

/// Cheap-to-clone handle to an open WebSocket session.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    remote_addr: SocketAddr,
    connected_at: DateTime<Utc>,
    outbound: mpsc::Sender<RelayMessage>,
    closer: CancellationToken,
}

impl Connection {
    /// Creates a connection handle and the receiving end of its outbound
    /// queue.
    ///
    /// `capacity` bounds the number of queued, not yet written messages
    /// (a value of 0 is treated as 1). The connection's close signal is a
    /// child of `parent`, so cancelling `parent` closes every connection
    /// created from it.
    #[must_use]
    pub fn new(
        remote_addr: SocketAddr,
        capacity: usize,
        parent: &CancellationToken,
    ) -> (Self, mpsc::Receiver<RelayMessage>) {
        let (outbound, outbound_rx) = mpsc::channel(capacity.max(1));
        let conn = Self {
            id: ConnectionId::new(),
            remote_addr,
            connected_at: Utc::now(),
            outbound,
            closer: parent.child_token(),
        };
        (conn, outbound_rx)
    }

    /// Returns the registry key of this connection.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the peer address. Diagnostic only.
    #[must_use]
    pub const fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Returns the time the handshake completed.
    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Queues a message for delivery without waiting.
    ///
    /// # Errors
    ///
    /// - [`RelayError::DestinationClosed`] if the connection is closing or
    ///   its transport loop has exited.
    /// - [`RelayError::DestinationBacklogged`] if the outbound queue is full.
    pub fn try_send(&self, message: RelayMessage) -> Result<(), RelayError> {
        if self.closer.is_cancelled() {
            return Err(RelayError::DestinationClosed(self.id));
        }
        self.outbound.try_send(message).map_err(|err| match err {
            TrySendError::Full(_) => RelayError::DestinationBacklogged(self.id),
            TrySendError::Closed(_) => RelayError::DestinationClosed(self.id),
        })
    }

    /// Asks the transport loop to close this connection.
    ///
    /// Idempotent. The registry entry is removed by the transport loop once
    /// it observes the request.
    pub fn close(&self) {
        self.closer.cancel();
    }

    /// Returns `true` once a close has been requested or the transport loop
    /// has dropped its end of the queue.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closer.is_cancelled() || self.outbound.is_closed()
    }

    /// Completes when a close has been requested for this connection.
    pub async fn closed(&self) {
        self.closer.cancelled().await;
    }
}

//! Broadcast relay: fans every received message out to all connections.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{CloseReason, Connection, ConnectionHandler, ConnectionRegistry, RelayMessage};
use crate::error::RelayError;

/// Outcome of one broadcast round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Destinations the message was queued for.
    pub delivered: usize,
    /// Destinations skipped because they were already closing.
    pub closed: usize,
    /// Destinations closed because their outbound queue was full.
    pub evicted: usize,
}

impl BroadcastReport {
    /// Number of destinations that did not get the message.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.closed + self.evicted
    }
}

/// Relays each inbound message to every registered connection, sender
/// included.
///
/// Implements [`ConnectionHandler`]: `on_open` registers, `on_close`
/// unregisters and `on_message` broadcasts. Writes only enqueue onto each
/// destination's bounded outbound queue, so a stalled destination never
/// delays the others, and messages from one source reach each destination
/// in the order the source sent them.
#[derive(Debug, Clone)]
pub struct BroadcastRelay {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastRelay {
    /// Creates a relay over `registry`.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns a reference to the inner [`ConnectionRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Queues `message` for every registered connection.
    ///
    /// Write failures are confined to their destination: a closed
    /// destination is skipped, a backlogged one is closed and skipped, and
    /// the loop always continues.
    pub fn broadcast(&self, source: &Connection, message: &RelayMessage) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        self.registry.for_each(|dest| match dest.try_send(message.clone()) {
            Ok(()) => report.delivered += 1,
            Err(RelayError::DestinationBacklogged(id)) => {
                tracing::warn!(
                    conn_id = %id,
                    remote_addr = %dest.remote_addr(),
                    source = %source.id(),
                    "outbound queue full, evicting connection"
                );
                dest.close();
                report.evicted += 1;
            }
            Err(err) => {
                tracing::debug!(error = %err, "skipping closed destination");
                report.closed += 1;
            }
        });
        report
    }
}

impl ConnectionHandler for BroadcastRelay {
    fn on_open(&self, conn: &Connection) {
        self.registry.register(conn.clone());
        tracing::info!(
            conn_id = %conn.id(),
            remote_addr = %conn.remote_addr(),
            connections = self.registry.len(),
            "connection opened"
        );
    }

    fn on_message(&self, source: &Connection, message: RelayMessage) {
        let kind = message.kind();
        let bytes = message.len();
        let report = self.broadcast(source, &message);
        tracing::trace!(
            source = %source.id(),
            ?kind,
            bytes,
            delivered = report.delivered,
            dropped = report.dropped(),
            "message relayed"
        );
    }

    fn on_close(&self, conn: &Connection, reason: CloseReason) {
        let removed = self.registry.unregister(conn);
        let lifetime_secs = (Utc::now() - conn.connected_at()).num_seconds();
        tracing::info!(
            conn_id = %conn.id(),
            remote_addr = %conn.remote_addr(),
            %reason,
            removed,
            lifetime_secs,
            connections = self.registry.len(),
            "connection closed"
        );
    }
}

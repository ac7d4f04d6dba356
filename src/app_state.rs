//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::{ConnectionLimits, RelayConfig};
use crate::domain::{ConnectionRegistry, OriginPolicy};
use crate::service::BroadcastRelay;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Broadcast relay owning the connection registry.
    pub relay: Arc<BroadcastRelay>,
    /// Handshake admission policy.
    pub origin_policy: Arc<OriginPolicy>,
    /// Per-connection resource bounds.
    pub limits: ConnectionLimits,
    /// Cancelled when the server begins shutting down; every connection's
    /// close signal is a child of this token.
    pub shutdown: CancellationToken,
    /// Tracks running connection tasks so shutdown can wait for them.
    pub tasks: TaskTracker,
}

impl AppState {
    /// Builds the state for a fresh relay with an empty registry.
    #[must_use]
    pub fn new(config: &RelayConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        Self {
            relay: Arc::new(BroadcastRelay::new(registry)),
            origin_policy: Arc::new(config.origin_policy()),
            limits: config.limits,
            shutdown: CancellationToken::new(),
            tasks: TaskTracker::new(),
        }
    }

    /// Returns the live connection registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        self.relay.registry()
    }
}

//! Lifecycle events of a WebSocket connection.

use std::fmt;

use super::{Connection, RelayMessage};

/// Why a connection's transport loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The client sent a close frame or the stream ended.
    Client,
    /// Reading from or writing to the socket failed.
    Transport(String),
    /// The server asked the connection to close (shutdown or eviction).
    Server,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "client closed"),
            Self::Transport(err) => write!(f, "transport error: {err}"),
            Self::Server => write!(f, "closed by server"),
        }
    }
}

/// Receiver of connection lifecycle events.
///
/// The WebSocket runtime calls these from each connection's own task, so
/// implementations are invoked concurrently for different connections and
/// must not block. For a single connection the order is always
/// `on_open`, any number of `on_message`, then exactly one `on_close`.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// A handshake completed and `conn` is ready to receive messages.
    fn on_open(&self, conn: &Connection);

    /// `source` delivered a text or binary message.
    fn on_message(&self, source: &Connection, message: RelayMessage);

    /// The transport of `conn` closed.
    fn on_close(&self, conn: &Connection, reason: CloseReason);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_reason_display() {
        assert_eq!(CloseReason::Client.to_string(), "client closed");
        assert_eq!(
            CloseReason::Transport("reset".to_string()).to_string(),
            "transport error: reset"
        );
        assert_eq!(CloseReason::Server.to_string(), "closed by server");
    }
}

//! Domain layer: connection identity, the connection registry, origin
//! admission, and the lifecycle contract between the WebSocket runtime and
//! the relay.

pub mod connection;
pub mod connection_handler;
pub mod connection_id;
pub mod connection_registry;
pub mod message;
pub mod origin_policy;

pub use connection::Connection;
pub use connection_handler::{CloseReason, ConnectionHandler};
pub use connection_id::ConnectionId;
pub use connection_registry::ConnectionRegistry;
pub use message::{MessageKind, RelayMessage};
pub use origin_policy::OriginPolicy;

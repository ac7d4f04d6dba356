//! WebSocket layer: handshake admission and the per-connection I/O loop.
//!
//! The WebSocket endpoint at `/ws` accepts any client admitted by the
//! origin policy; every text or binary frame a client sends is relayed to
//! all connected clients.

pub mod connection;
pub mod handler;

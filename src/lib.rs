//! # broadcast-relay
//!
//! Minimal WebSocket relay. Clients connect to `/ws`; every text or binary
//! message any client sends is relayed, unchanged, to every connected
//! client including the sender. `/health` reports liveness.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, HTTP)
//!     │
//!     ├── Handshake Handler (ws/handler)  ── OriginPolicy (domain/)
//!     ├── Connection loop (ws/connection)
//!     │
//!     ├── BroadcastRelay (service/)       ── ConnectionHandler (domain/)
//!     │
//!     └── ConnectionRegistry (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod ws;

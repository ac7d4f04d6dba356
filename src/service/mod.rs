//! Service layer: message relaying.
//!
//! [`BroadcastRelay`] reacts to connection lifecycle events, keeping the
//! [`super::domain::ConnectionRegistry`] in sync and fanning messages out.

pub mod broadcast_relay;

pub use broadcast_relay::{BroadcastRelay, BroadcastReport};

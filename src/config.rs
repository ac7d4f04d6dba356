//! Relay configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`) and are read once at startup; nothing changes for the life of
//! the process.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::OriginPolicy;
use crate::error::RelayError;

/// Default listen address.
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Per-connection resource bounds enforced at the WebSocket layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionLimits {
    /// Maximum number of simultaneously registered connections.
    pub max_connections: usize,
    /// Outbound messages buffered per connection before it is evicted.
    pub outbound_queue_capacity: usize,
    /// Largest inbound message accepted, in bytes.
    pub max_message_bytes: usize,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self {
            max_connections: 1_000_000,
            outbound_queue_capacity: 1024,
            max_message_bytes: 64 << 20,
        }
    }
}

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Comma-separated substrings an `Origin` header is checked against.
    pub allow_list: String,

    /// Admit `localhost` origins.
    pub dev_mode: bool,

    /// Connection resource bounds.
    pub limits: ConnectionLimits,

    /// Seconds to wait for open connections to close on shutdown.
    pub shutdown_grace_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            allow_list: String::new(),
            dev_mode: false,
            limits: ConnectionLimits::default(),
            shutdown_grace_secs: 3,
        }
    }
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to the [`Default`] value when a variable is not set or
    /// cannot be parsed. Calls `dotenvy::dotenv().ok()` to optionally load
    /// a `.env` file.
    ///
    /// | Variable                  | Default        |
    /// |---------------------------|----------------|
    /// | `LISTEN_ADDR`             | `0.0.0.0:8080` |
    /// | `ALLOW_LIST`              | empty          |
    /// | `DEV_MODE`                | `false`        |
    /// | `MAX_CONNECTIONS`         | `1000000`      |
    /// | `OUTBOUND_QUEUE_CAPACITY` | `1024`         |
    /// | `MAX_MESSAGE_BYTES`       | `67108864`     |
    /// | `SHUTDOWN_GRACE_SECS`     | `3`            |
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `LISTEN_ADDR` is set but cannot be
    /// parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let raw_addr =
            std::env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = raw_addr
            .parse()
            .map_err(|err| RelayError::Config(format!("LISTEN_ADDR {raw_addr:?}: {err}")))?;

        let allow_list = std::env::var("ALLOW_LIST").unwrap_or_default();
        let dev_mode = parse_env_bool("DEV_MODE", defaults.dev_mode);

        let limits = ConnectionLimits {
            max_connections: parse_env("MAX_CONNECTIONS", defaults.limits.max_connections),
            outbound_queue_capacity: parse_env(
                "OUTBOUND_QUEUE_CAPACITY",
                defaults.limits.outbound_queue_capacity,
            ),
            max_message_bytes: parse_env("MAX_MESSAGE_BYTES", defaults.limits.max_message_bytes),
        };

        let shutdown_grace_secs = parse_env("SHUTDOWN_GRACE_SECS", defaults.shutdown_grace_secs);

        Ok(Self {
            listen_addr,
            allow_list,
            dev_mode,
            limits,
            shutdown_grace_secs,
        })
    }

    /// Builds the origin admission policy from the allow-list and dev flag.
    #[must_use]
    pub fn origin_policy(&self) -> OriginPolicy {
        OriginPolicy::new(&self.allow_list, self.dev_mode)
    }

    /// Returns the graceful-shutdown bound.
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean.
fn parse_env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

/// Accepts `"true"`, `"1"`, `"false"`, `"0"` (case-insensitive).
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type. Handshake failures render as
//! structured JSON error responses; per-destination write failures stay
//! inside the broadcast loop and startup failures end the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::ConnectionId;

/// Structured JSON error response body.
///
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "origin not allowed: https://evil.example"
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Relay error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status                   |
/// |-----------|---------------------|-------------------------------|
/// | 1000–1999 | Handshake rejection | 403 / upgrade rejection status |
/// | 2000–2999 | Destination write   | 500 (never sent to clients)   |
/// | 3000–3999 | Server              | 500 / 503                     |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The handshake's `Origin` header is not admitted by the policy.
    #[error("origin not allowed: {0}")]
    OriginRejected(String),

    /// The request could not be upgraded to a WebSocket.
    #[error("websocket upgrade rejected: {reason}")]
    HandshakeRejected {
        /// Status reported by the upgrade extractor.
        status: StatusCode,
        /// Extractor's explanation.
        reason: String,
    },

    /// The relay already holds the configured maximum of connections.
    #[error("connection limit of {limit} reached")]
    CapacityExceeded {
        /// Configured maximum.
        limit: usize,
    },

    /// The relay is shutting down and accepts no new connections.
    #[error("relay is shutting down")]
    ShuttingDown,

    /// The destination connection is closing or closed.
    #[error("connection {0} is closed")]
    DestinationClosed(ConnectionId),

    /// The destination's outbound queue is full.
    #[error("connection {0} outbound queue is full")]
    DestinationBacklogged(ConnectionId),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Listener or socket I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::OriginRejected(_) => 1001,
            Self::HandshakeRejected { .. } => 1002,
            Self::DestinationClosed(_) => 2001,
            Self::DestinationBacklogged(_) => 2002,
            Self::Io(_) => 3001,
            Self::CapacityExceeded { .. } => 3002,
            Self::Config(_) => 3003,
            Self::ShuttingDown => 3004,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::OriginRejected(_) => StatusCode::FORBIDDEN,
            Self::HandshakeRejected { status, .. } => *status,
            Self::CapacityExceeded { .. } | Self::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            Self::DestinationClosed(_)
            | Self::DestinationBacklogged(_)
            | Self::Config(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn origin_rejection_is_forbidden() {
        let err = RelayError::OriginRejected("https://evil.example".to_string());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.error_code(), 1001);
    }

    #[test]
    fn handshake_rejection_keeps_extractor_status() {
        let err = RelayError::HandshakeRejected {
            status: StatusCode::UPGRADE_REQUIRED,
            reason: "missing upgrade header".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::UPGRADE_REQUIRED);
    }

    #[test]
    fn capacity_is_service_unavailable() {
        let err = RelayError::CapacityExceeded { limit: 10 };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "connection limit of 10 reached");
    }

    #[tokio::test]
    async fn renders_json_body() {
        let response = RelayError::OriginRejected("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body should be readable");
        };
        let Ok(json) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            panic!("body should be JSON");
        };
        assert_eq!(json["error"]["code"], 1001);
        assert_eq!(json["error"]["message"], "origin not allowed: x");
    }
}

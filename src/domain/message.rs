//! Relayed message payloads.

use axum::body::Bytes;
use axum::extract::ws::{Message, Utf8Bytes};
use serde::Serialize;

/// Frame type of a relayed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// UTF-8 text frame.
    Text,
    /// Binary frame.
    Binary,
}

/// An opaque payload tagged with its frame type.
///
/// Both variants hold reference-counted buffers, so cloning a message for
/// every destination of a broadcast does not copy the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    /// Text payload, forwarded as a text frame.
    Text(Utf8Bytes),
    /// Binary payload, forwarded as a binary frame.
    Binary(Bytes),
}

impl RelayMessage {
    /// Returns the frame type of this message.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Text(_) => MessageKind::Text,
            Self::Binary(_) => MessageKind::Binary,
        }
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.as_str().len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts an inbound WebSocket frame into a relayable message.
    ///
    /// Control frames (ping, pong, close) carry no relayable payload and
    /// yield `None`.
    #[must_use]
    pub fn from_frame(frame: Message) -> Option<Self> {
        match frame {
            Message::Text(text) => Some(Self::Text(text)),
            Message::Binary(bytes) => Some(Self::Binary(bytes)),
            Message::Ping(_) | Message::Pong(_) | Message::Close(_) => None,
        }
    }
}

impl From<RelayMessage> for Message {
    fn from(message: RelayMessage) -> Self {
        match message {
            RelayMessage::Text(text) => Self::Text(text),
            RelayMessage::Binary(bytes) => Self::Binary(bytes),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn text_frame_keeps_kind_and_payload() {
        let Some(msg) = RelayMessage::from_frame(Message::text("hello")) else {
            panic!("text frame should be relayable");
        };
        assert_eq!(msg.kind(), MessageKind::Text);
        assert_eq!(msg.len(), 5);
        assert_eq!(Message::from(msg), Message::text("hello"));
    }

    #[test]
    fn binary_frame_keeps_kind_and_payload() {
        let payload = Bytes::from_static(&[0, 159, 146, 150]);
        let Some(msg) = RelayMessage::from_frame(Message::Binary(payload.clone())) else {
            panic!("binary frame should be relayable");
        };
        assert_eq!(msg.kind(), MessageKind::Binary);
        assert_eq!(Message::from(msg), Message::Binary(payload));
    }

    #[test]
    fn control_frames_are_not_relayed() {
        assert!(RelayMessage::from_frame(Message::Ping(Bytes::new())).is_none());
        assert!(RelayMessage::from_frame(Message::Pong(Bytes::new())).is_none());
        assert!(RelayMessage::from_frame(Message::Close(None)).is_none());
    }

    #[test]
    fn empty_payload() {
        assert!(RelayMessage::Binary(Bytes::new()).is_empty());
    }
}

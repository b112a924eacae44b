//! WebSocket message types for realtime channels.
//!
//! Defines the protocol between server and connected clients:
//! - Server → Client: connection and membership acknowledgements, plus
//!   broadcast payloads forwarded verbatim
//! - Client → Server: subscribe / unsubscribe requests; any other `type` is
//!   accepted and ignored

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::foundation::{ChannelName, ConnectionId, Timestamp, UserId};

/// A serialized text frame queued for one connection.
///
/// Broadcasts serialize once and share the frame across all recipients.
pub type OutboundFrame = Arc<str>;

// ============================================
// Server → Client Messages
// ============================================

/// Acknowledgements the channel manager sends to a single connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection registered.
    Connected(ConnectedMessage),

    /// Subscription to a channel accepted.
    Subscribed(ChannelAck),

    /// Subscription to a channel removed.
    Unsubscribed(ChannelAck),
}

/// Sent immediately after the transport handshake.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub connection_id: ConnectionId,
    pub timestamp: Timestamp,
}

/// Echoes the channel a membership request applied to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelAck {
    pub channel: ChannelName,
    pub timestamp: Timestamp,
}

impl ServerMessage {
    pub fn connected(connection_id: ConnectionId) -> Self {
        Self::Connected(ConnectedMessage {
            connection_id,
            timestamp: Timestamp::now(),
        })
    }

    pub fn subscribed(channel: ChannelName) -> Self {
        Self::Subscribed(ChannelAck {
            channel,
            timestamp: Timestamp::now(),
        })
    }

    pub fn unsubscribed(channel: ChannelName) -> Self {
        Self::Unsubscribed(ChannelAck {
            channel,
            timestamp: Timestamp::now(),
        })
    }

    /// Serialize into a text frame.
    pub fn to_frame(&self) -> Result<OutboundFrame, serde_json::Error> {
        serde_json::to_string(self).map(OutboundFrame::from)
    }
}

/// Serialize an arbitrary broadcast payload into a text frame, unchanged.
pub fn payload_frame(payload: &Value) -> OutboundFrame {
    // Serializing a `Value` cannot fail: its map keys are always strings.
    OutboundFrame::from(payload.to_string())
}

// ============================================
// Client → Server Messages
// ============================================

/// Request to join a channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    #[serde(default)]
    pub channel: Option<String>,
    /// Raw `userId`; see [`SubscribeRequest::user_id`].
    #[serde(default, rename = "userId")]
    pub raw_user_id: Option<Value>,
}

impl SubscribeRequest {
    /// The supplied user id, when it is a whole number that fits an `i64`.
    ///
    /// `Err` carries a `userId` that was present but unusable; it never
    /// invalidates the subscription itself.
    pub fn user_id(&self) -> Result<Option<UserId>, &Value> {
        match &self.raw_user_id {
            None => Ok(None),
            Some(raw) => UserId::from_json(raw).map(Some).ok_or(raw),
        }
    }
}

/// Request to leave a channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct UnsubscribeRequest {
    #[serde(default)]
    pub channel: Option<String>,
}

/// All message types that can be received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Subscribe(SubscribeRequest),
    Unsubscribe(UnsubscribeRequest),

    /// Any other (or missing) `type`. Left to application-level handlers.
    Other { kind: Option<String> },
}

/// Reasons an incoming frame could not be decoded.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Payload is not a JSON object")]
    NotAnObject,

    #[error("Invalid fields for '{kind}' message: {source}")]
    InvalidFields {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientMessage {
    /// Decode a raw text frame.
    ///
    /// Dispatches on the `type` field; only `subscribe` and `unsubscribe`
    /// have their remaining fields checked.
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(raw).map_err(ProtocolError::InvalidJson)?;
        let Value::Object(fields) = value else {
            return Err(ProtocolError::NotAnObject);
        };

        let kind = fields.get("type").and_then(Value::as_str).map(str::to_owned);
        match kind.as_deref() {
            Some("subscribe") => serde_json::from_value(Value::Object(fields))
                .map(Self::Subscribe)
                .map_err(|source| ProtocolError::InvalidFields {
                    kind: "subscribe",
                    source,
                }),
            Some("unsubscribe") => serde_json::from_value(Value::Object(fields))
                .map(Self::Unsubscribe)
                .map_err(|source| ProtocolError::InvalidFields {
                    kind: "unsubscribe",
                    source,
                }),
            _ => Ok(Self::Other { kind }),
        }
    }
}

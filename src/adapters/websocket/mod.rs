//! WebSocket adapters for realtime channels.
//!
//! Clients open a single WebSocket, join and leave named channels, and
//! receive whatever is broadcast to those channels (or to everyone).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  subscribe / unsubscribe   ┌──────────────────────────┐
//! │  Connection  │ ─────────────────────────▶ │      ChannelManager      │
//! │ (ws handler) │ ◀───────────────────────── │  room-1: {a, b}          │
//! └──────────────┘   acks + broadcast frames  │  workflow-42: {a, c}     │
//!                                             └──────────────────────────┘
//!                                                          ▲
//!                                                          │ Broadcaster port
//!                                              application / HTTP producers
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`channels`] - Channel membership registry and fan-out
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod channels;
pub mod handler;
pub mod messages;

pub use channels::{ChannelManager, ConnectionSender};
pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use messages::{
    ChannelAck, ClientMessage, ConnectedMessage, OutboundFrame, ProtocolError, ServerMessage,
    SubscribeRequest, UnsubscribeRequest,
};

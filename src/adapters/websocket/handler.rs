//! WebSocket upgrade handler for realtime channel connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Upgrade to WebSocket
//! 2. Register with the channel manager (sends `connected`)
//! 3. Forward queued frames to the client while feeding client frames to
//!    the manager
//! 4. Deregister from every channel on close or error

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::domain::foundation::ConnectionId;

use super::{channels::ChannelManager, messages::OutboundFrame};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    /// Channel registry shared by every connection.
    pub channel_manager: Arc<ChannelManager>,

    /// Largest inbound message accepted, in bytes.
    pub max_message_bytes: usize,
}

impl WebSocketState {
    /// Create a new WebSocket state.
    pub fn new(channel_manager: Arc<ChannelManager>, max_message_bytes: usize) -> Self {
        Self {
            channel_manager,
            max_message_bytes,
        }
    }
}

/// Handle WebSocket upgrade requests.
///
/// No sub-protocol is negotiated and no authentication is performed here;
/// the user id a client reports arrives later with `subscribe`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WebSocketState>) -> Response {
    ws.max_message_size(state.max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state.channel_manager))
}

/// Drive an established WebSocket connection until either side ends it.
async fn handle_socket(socket: WebSocket, channel_manager: Arc<ChannelManager>) {
    let (sender, mut receiver) = socket.split();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<OutboundFrame>();

    let connection_id = channel_manager.accept(outbound_tx).await;

    let mut send_task = tokio::spawn(forward_outbound(sender, outbound_rx, connection_id));

    let manager = channel_manager.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    manager.handle_message(connection_id, &text).await;
                }
                Ok(Message::Binary(_)) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        "Received unsupported binary message"
                    );
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Protocol-level keepalive, answered by axum.
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        "Client sent close frame"
                    );
                    break;
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        "Receive error: {}",
                        e
                    );
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    channel_manager.disconnect(connection_id).await;
}

/// Write queued frames to the socket until the queue closes or a write fails.
async fn forward_outbound(
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::UnboundedReceiver<OutboundFrame>,
    connection_id: ConnectionId,
) {
    while let Some(frame) = outbound_rx.recv().await {
        if let Err(e) = sender.send(Message::Text(frame.to_string())).await {
            tracing::debug!(
                connection_id = %connection_id,
                "Send error, closing connection: {}",
                e
            );
            break;
        }
    }
}

/// Create axum router for the WebSocket endpoint.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .merge(websocket_router("/ws"))
///     .with_state(ws_state);
/// ```
pub fn websocket_router(path: &str) -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route(path, get(ws_handler))
}

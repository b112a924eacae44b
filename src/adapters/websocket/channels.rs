//! Channel registry and fan-out for realtime connections.
//!
//! Connections join named channels; a broadcast reaches every member of a
//! channel, or every connection when sent to all.
//!
//! # Architecture
//!
//! ```text
//! Channel: room-1      Channel: workflow-42
//! ├── conn-a           ├── conn-a
//! └── conn-b           └── conn-c
//!
//! conn-d (no subscriptions, still reached by broadcast_to_all)
//! ```
//!
//! Channels are created on first subscribe and removed as soon as their last
//! member leaves or disconnects.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};

use crate::domain::foundation::{ChannelName, ConnectionId, UserId};
use crate::ports::Broadcaster;

use super::messages::{payload_frame, ClientMessage, OutboundFrame, ServerMessage};

/// Sending half of a connection's outbound frame queue.
///
/// The transport's write task owns the receiving half; once it goes away the
/// connection is no longer open and sends to it are skipped.
pub type ConnectionSender = mpsc::UnboundedSender<OutboundFrame>;

struct ConnectionEntry {
    outbound: ConnectionSender,
    user_id: Option<UserId>,
    /// Reverse index of `Registry::channels`, kept in lockstep.
    channels: HashSet<ChannelName>,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    channels: HashMap<ChannelName, HashSet<ConnectionId>>,
}

/// Manages channel membership and message fan-out for all connections.
///
/// Provides:
/// - Connection accept/disconnect
/// - Channel subscribe/unsubscribe with automatic cleanup of empty channels
/// - Broadcast to one channel or to every connection
///
/// # Concurrency
///
/// All state lives in one registry behind a single `RwLock`. Every mutation
/// takes the write guard, so only one writer touches membership at a time.
/// Broadcasts hold the read guard for the whole fan-out, which pins the member
/// set for the duration of the loop. Sends only enqueue, so the guard is
/// never held across I/O.
pub struct ChannelManager {
    registry: RwLock<Registry>,
}

impl ChannelManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
        }
    }

    /// Register a new connection and send it a `connected` acknowledgement.
    ///
    /// # Arguments
    ///
    /// * `outbound` - Queue the connection's write task drains
    ///
    /// # Returns
    ///
    /// The identifier assigned to the connection.
    pub async fn accept(&self, outbound: ConnectionSender) -> ConnectionId {
        let connection_id = ConnectionId::new();
        send_ack(&outbound, connection_id, ServerMessage::connected(connection_id));

        self.registry.write().await.connections.insert(
            connection_id,
            ConnectionEntry {
                outbound,
                user_id: None,
                channels: HashSet::new(),
            },
        );

        tracing::info!(connection_id = %connection_id, "Connection accepted");
        connection_id
    }

    /// Handle a raw text frame received from a connection.
    ///
    /// Malformed payloads and unrecognized message types are logged and
    /// dropped; neither produces a response nor affects the connection.
    pub async fn handle_message(&self, connection_id: ConnectionId, raw: &str) {
        let message = match ClientMessage::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Dropping malformed message"
                );
                return;
            }
        };

        match message {
            ClientMessage::Subscribe(request) => {
                let user_id = request.user_id().unwrap_or_else(|raw| {
                    tracing::warn!(
                        connection_id = %connection_id,
                        user_id = %raw,
                        "Ignoring unusable userId"
                    );
                    None
                });
                match request.channel.map(ChannelName::new) {
                    Some(Ok(channel)) => {
                        self.subscribe(connection_id, channel, user_id).await;
                    }
                    _ => tracing::debug!(
                        connection_id = %connection_id,
                        "Subscribe without channel ignored"
                    ),
                }
            }
            ClientMessage::Unsubscribe(request) => {
                match request.channel.map(ChannelName::new) {
                    Some(Ok(channel)) => {
                        self.unsubscribe(connection_id, &channel).await;
                    }
                    _ => tracing::debug!(
                        connection_id = %connection_id,
                        "Unsubscribe without channel ignored"
                    ),
                }
            }
            ClientMessage::Other { kind } => {
                tracing::debug!(
                    connection_id = %connection_id,
                    message_type = kind.as_deref().unwrap_or("<missing>"),
                    "Ignoring unrecognized message type"
                );
            }
        }
    }

    /// Add a connection to a channel, creating the channel if needed.
    ///
    /// Sends a `subscribed` acknowledgement to the connection. Subscribing
    /// twice leaves a single membership.
    ///
    /// # Returns
    ///
    /// `false` if the connection is not registered (nothing changes).
    pub async fn subscribe(
        &self,
        connection_id: ConnectionId,
        channel: ChannelName,
        user_id: Option<UserId>,
    ) -> bool {
        let mut guard = self.registry.write().await;
        let registry = &mut *guard;

        let Some(entry) = registry.connections.get_mut(&connection_id) else {
            tracing::debug!(
                connection_id = %connection_id,
                channel = %channel,
                "Subscribe from unknown connection ignored"
            );
            return false;
        };

        if user_id.is_some() {
            entry.user_id = user_id;
        }
        entry.channels.insert(channel.clone());
        registry
            .channels
            .entry(channel.clone())
            .or_default()
            .insert(connection_id);

        tracing::debug!(
            connection_id = %connection_id,
            channel = %channel,
            user_id = ?entry.user_id.map(|u| u.value()),
            "Subscribed to channel"
        );
        send_ack(&entry.outbound, connection_id, ServerMessage::subscribed(channel));
        true
    }

    /// Remove a connection from a channel.
    ///
    /// A channel that does not exist is a no-op. Otherwise the membership is
    /// removed (if present), the channel is deleted when it becomes empty, and
    /// an `unsubscribed` acknowledgement is sent.
    ///
    /// # Returns
    ///
    /// `true` if the channel existed.
    pub async fn unsubscribe(&self, connection_id: ConnectionId, channel: &ChannelName) -> bool {
        let mut guard = self.registry.write().await;
        let registry = &mut *guard;

        let Some(members) = registry.channels.get_mut(channel) else {
            tracing::debug!(
                connection_id = %connection_id,
                channel = %channel,
                "Unsubscribe from unknown channel ignored"
            );
            return false;
        };

        members.remove(&connection_id);
        if members.is_empty() {
            registry.channels.remove(channel);
            tracing::debug!(channel = %channel, "Channel removed");
        }

        if let Some(entry) = registry.connections.get_mut(&connection_id) {
            entry.channels.remove(channel);
            send_ack(
                &entry.outbound,
                connection_id,
                ServerMessage::unsubscribed(channel.clone()),
            );
        }

        tracing::debug!(
            connection_id = %connection_id,
            channel = %channel,
            "Unsubscribed from channel"
        );
        true
    }

    /// Forget a connection and remove it from every channel it joined.
    ///
    /// Channels left without members are deleted. Safe to call more than
    /// once.
    ///
    /// # Returns
    ///
    /// `true` if the connection was registered.
    pub async fn disconnect(&self, connection_id: ConnectionId) -> bool {
        let mut guard = self.registry.write().await;
        let registry = &mut *guard;

        let Some(entry) = registry.connections.remove(&connection_id) else {
            return false;
        };

        let membership_count = entry.channels.len();
        for channel in entry.channels {
            if let Some(members) = registry.channels.get_mut(&channel) {
                members.remove(&connection_id);
                if members.is_empty() {
                    registry.channels.remove(&channel);
                    tracing::debug!(channel = %channel, "Channel removed");
                }
            }
        }

        tracing::info!(
            connection_id = %connection_id,
            channels = membership_count,
            "Connection closed"
        );
        true
    }

    /// Send a payload verbatim to every open member of a channel.
    ///
    /// If the channel has no members, this is a no-op. Members whose
    /// transport has closed are skipped.
    ///
    /// # Returns
    ///
    /// Number of connections the payload was handed to.
    pub async fn broadcast(&self, channel: &ChannelName, message: &Value) -> usize {
        let registry = self.registry.read().await;

        let Some(members) = registry.channels.get(channel) else {
            tracing::debug!(channel = %channel, "Broadcast to channel without subscribers");
            return 0;
        };

        let frame = payload_frame(message);
        let delivered = members
            .iter()
            .filter_map(|id| registry.connections.get(id))
            .filter(|entry| deliver(&entry.outbound, &frame))
            .count();

        tracing::trace!(
            channel = %channel,
            members = members.len(),
            delivered,
            "Broadcast to channel"
        );
        delivered
    }

    /// Send a payload verbatim to every open connection.
    ///
    /// # Returns
    ///
    /// Number of connections the payload was handed to.
    pub async fn broadcast_to_all(&self, message: &Value) -> usize {
        let registry = self.registry.read().await;

        let frame = payload_frame(message);
        let delivered = registry
            .connections
            .values()
            .filter(|entry| deliver(&entry.outbound, &frame))
            .count();

        tracing::debug!(
            connections = registry.connections.len(),
            delivered,
            "Broadcast to all connections"
        );
        delivered
    }

    /// Whether a connection is currently a member of a channel.
    pub async fn is_member(&self, connection_id: ConnectionId, channel: &ChannelName) -> bool {
        self.registry
            .read()
            .await
            .channels
            .get(channel)
            .is_some_and(|members| members.contains(&connection_id))
    }

    /// Number of members in a channel (0 if the channel doesn't exist).
    pub async fn member_count(&self, channel: &ChannelName) -> usize {
        self.registry
            .read()
            .await
            .channels
            .get(channel)
            .map(HashSet::len)
            .unwrap_or(0)
    }

    /// All channels that currently have members.
    pub async fn active_channels(&self) -> Vec<ChannelName> {
        self.registry.read().await.channels.keys().cloned().collect()
    }

    /// Channels a connection belongs to (empty if unknown).
    pub async fn channels_of(&self, connection_id: ConnectionId) -> Vec<ChannelName> {
        self.registry
            .read()
            .await
            .connections
            .get(&connection_id)
            .map(|entry| entry.channels.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// User id a connection supplied when subscribing, if any.
    pub async fn user_id_of(&self, connection_id: ConnectionId) -> Option<UserId> {
        self.registry
            .read()
            .await
            .connections
            .get(&connection_id)
            .and_then(|entry| entry.user_id)
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.connections.len()
    }

    /// Channel names with their member counts, sorted by name.
    pub async fn snapshot(&self) -> Vec<(ChannelName, usize)> {
        let registry = self.registry.read().await;
        let mut channels: Vec<_> = registry
            .channels
            .iter()
            .map(|(name, members)| (name.clone(), members.len()))
            .collect();
        channels.sort_by(|a, b| a.0.cmp(&b.0));
        channels
    }
}

impl Default for ChannelManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broadcaster for ChannelManager {
    async fn broadcast(&self, channel: &ChannelName, message: Value) -> usize {
        ChannelManager::broadcast(self, channel, &message).await
    }

    async fn broadcast_to_all(&self, message: Value) -> usize {
        ChannelManager::broadcast_to_all(self, &message).await
    }
}

/// Enqueue a frame if the connection is still open.
fn deliver(outbound: &ConnectionSender, frame: &OutboundFrame) -> bool {
    !outbound.is_closed() && outbound.send(frame.clone()).is_ok()
}

fn send_ack(outbound: &ConnectionSender, connection_id: ConnectionId, message: ServerMessage) {
    match message.to_frame() {
        Ok(frame) => {
            deliver(outbound, &frame);
        }
        Err(e) => tracing::error!(
            connection_id = %connection_id,
            error = %e,
            "Failed to serialize acknowledgement"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn channel(name: &str) -> ChannelName {
        ChannelName::new(name).unwrap()
    }

    /// Accept a connection and consume its `connected` frame.
    async fn connect(manager: &ChannelManager) -> (ConnectionId, UnboundedReceiver<OutboundFrame>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = manager.accept(tx).await;
        let connected = next_frame(&mut rx).expect("connected frame");
        assert_eq!(connected["type"], "connected");
        (id, rx)
    }

    fn next_frame(rx: &mut UnboundedReceiver<OutboundFrame>) -> Option<Value> {
        rx.try_recv()
            .ok()
            .map(|frame| serde_json::from_str(&frame).unwrap())
    }

    fn drain(rx: &mut UnboundedReceiver<OutboundFrame>) -> Vec<Value> {
        std::iter::from_fn(|| next_frame(rx)).collect()
    }

    #[tokio::test]
    async fn accept_sends_connected_with_timestamp() {
        let manager = ChannelManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let id = manager.accept(tx).await;

        let frame = next_frame(&mut rx).unwrap();
        assert_eq!(frame["type"], "connected");
        assert_eq!(frame["connectionId"], id.to_string());
        assert!(frame["timestamp"].is_string());
        assert_eq!(manager.connection_count().await, 1);
    }

    #[tokio::test]
    async fn subscribe_creates_channel_and_acknowledges() {
        let manager = ChannelManager::new();
        let (id, mut rx) = connect(&manager).await;

        manager
            .handle_message(id, r#"{"type":"subscribe","channel":"room-1"}"#)
            .await;

        assert!(manager.is_member(id, &channel("room-1")).await);
        assert_eq!(manager.active_channels().await, vec![channel("room-1")]);

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "subscribed");
        assert_eq!(frames[0]["channel"], "room-1");
    }

    #[tokio::test]
    async fn subscribe_ack_goes_only_to_requester() {
        let manager = ChannelManager::new();
        let (a, _rx_a) = connect(&manager).await;
        let (b, mut rx_b) = connect(&manager).await;
        manager.subscribe(b, channel("room-1"), None).await;
        drain(&mut rx_b);

        manager.subscribe(a, channel("room-1"), None).await;

        assert!(drain(&mut rx_b).is_empty());
    }

    #[tokio::test]
    async fn subscribe_records_user_id() {
        let manager = ChannelManager::new();
        let (id, _rx) = connect(&manager).await;

        manager
            .handle_message(id, r#"{"type":"subscribe","channel":"room-1","userId":17}"#)
            .await;

        assert_eq!(manager.user_id_of(id).await, Some(UserId::new(17)));
    }

    #[tokio::test]
    async fn subscribe_accepts_whole_float_user_id() {
        let manager = ChannelManager::new();
        let (a, mut rx_a) = connect(&manager).await;
        let (b, mut rx_b) = connect(&manager).await;

        manager
            .handle_message(a, r#"{"type":"subscribe","channel":"room-1","userId":17.0}"#)
            .await;
        manager
            .handle_message(b, r#"{"type":"subscribe","channel":"room-2","userId":1e3}"#)
            .await;

        assert!(manager.is_member(a, &channel("room-1")).await);
        assert!(manager.is_member(b, &channel("room-2")).await);
        assert_eq!(manager.user_id_of(a).await, Some(UserId::new(17)));
        assert_eq!(manager.user_id_of(b).await, Some(UserId::new(1000)));
        assert_eq!(drain(&mut rx_a)[0]["type"], "subscribed");
        assert_eq!(drain(&mut rx_b)[0]["type"], "subscribed");
    }

    #[tokio::test]
    async fn subscribe_with_unusable_user_id_still_joins() {
        let manager = ChannelManager::new();
        let (id, mut rx) = connect(&manager).await;

        for raw in [
            r#"{"type":"subscribe","channel":"room-1","userId":17.5}"#,
            r#"{"type":"subscribe","channel":"room-2","userId":"seventeen"}"#,
        ] {
            manager.handle_message(id, raw).await;
        }

        assert!(manager.is_member(id, &channel("room-1")).await);
        assert!(manager.is_member(id, &channel("room-2")).await);
        assert_eq!(manager.user_id_of(id).await, None);
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[tokio::test]
    async fn subscribe_twice_keeps_single_membership() {
        let manager = ChannelManager::new();
        let (id, mut rx) = connect(&manager).await;

        manager.subscribe(id, channel("room-1"), None).await;
        manager.subscribe(id, channel("room-1"), None).await;

        assert_eq!(manager.member_count(&channel("room-1")).await, 1);
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[tokio::test]
    async fn subscribe_without_channel_is_noop() {
        let manager = ChannelManager::new();
        let (id, mut rx) = connect(&manager).await;

        manager.handle_message(id, r#"{"type":"subscribe"}"#).await;
        manager
            .handle_message(id, r#"{"type":"subscribe","channel":""}"#)
            .await;
        manager
            .handle_message(id, r#"{"type":"subscribe","channel":null}"#)
            .await;

        assert!(manager.active_channels().await.is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn subscribe_from_unknown_connection_is_ignored() {
        let manager = ChannelManager::new();

        let accepted = manager
            .subscribe(ConnectionId::new(), channel("room-1"), None)
            .await;

        assert!(!accepted);
        assert!(manager.active_channels().await.is_empty());
    }

    #[tokio::test]
    async fn unsubscribe_removes_membership_and_empty_channel() {
        let manager = ChannelManager::new();
        let (id, mut rx) = connect(&manager).await;
        manager.subscribe(id, channel("room-1"), None).await;
        drain(&mut rx);

        manager
            .handle_message(id, r#"{"type":"unsubscribe","channel":"room-1"}"#)
            .await;

        assert!(!manager.is_member(id, &channel("room-1")).await);
        assert!(manager.active_channels().await.is_empty());
        assert!(manager.channels_of(id).await.is_empty());

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "unsubscribed");
        assert_eq!(frames[0]["channel"], "room-1");
    }

    #[tokio::test]
    async fn unsubscribe_keeps_channel_with_other_members() {
        let manager = ChannelManager::new();
        let (a, _rx_a) = connect(&manager).await;
        let (b, _rx_b) = connect(&manager).await;
        manager.subscribe(a, channel("room-1"), None).await;
        manager.subscribe(b, channel("room-1"), None).await;

        manager.unsubscribe(a, &channel("room-1")).await;

        assert_eq!(manager.member_count(&channel("room-1")).await, 1);
        assert!(manager.is_member(b, &channel("room-1")).await);
    }

    #[tokio::test]
    async fn unsubscribe_without_channel_is_noop() {
        let manager = ChannelManager::new();
        let (id, mut rx) = connect(&manager).await;
        manager.subscribe(id, channel("room-1"), None).await;
        drain(&mut rx);

        manager.handle_message(id, r#"{"type":"unsubscribe"}"#).await;
        manager
            .handle_message(id, r#"{"type":"unsubscribe","channel":""}"#)
            .await;

        assert!(drain(&mut rx).is_empty());
        assert!(manager.is_member(id, &channel("room-1")).await);
        assert_eq!(manager.snapshot().await, vec![(channel("room-1"), 1)]);
    }

    #[tokio::test]
    async fn unsubscribe_from_unknown_channel_is_noop() {
        let manager = ChannelManager::new();
        let (id, mut rx) = connect(&manager).await;

        let existed = manager.unsubscribe(id, &channel("nowhere")).await;

        assert!(!existed);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn unsubscribe_from_existing_channel_without_membership_still_acks() {
        let manager = ChannelManager::new();
        let (a, _rx_a) = connect(&manager).await;
        let (b, mut rx_b) = connect(&manager).await;
        manager.subscribe(a, channel("room-1"), None).await;

        assert!(manager.unsubscribe(b, &channel("room-1")).await);

        assert_eq!(manager.member_count(&channel("room-1")).await, 1);
        let frames = drain(&mut rx_b);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "unsubscribed");
    }

    #[tokio::test]
    async fn disconnect_removes_all_memberships() {
        let manager = ChannelManager::new();
        let (a, _rx_a) = connect(&manager).await;
        let (b, _rx_b) = connect(&manager).await;
        manager.subscribe(a, channel("room-1"), None).await;
        manager.subscribe(a, channel("room-2"), None).await;
        manager.subscribe(b, channel("room-2"), None).await;

        assert!(manager.disconnect(a).await);

        assert_eq!(manager.active_channels().await, vec![channel("room-2")]);
        assert!(!manager.is_member(a, &channel("room-2")).await);
        assert!(manager.is_member(b, &channel("room-2")).await);
        assert_eq!(manager.connection_count().await, 1);
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let manager = ChannelManager::new();
        let (a, _rx_a) = connect(&manager).await;
        let (b, _rx_b) = connect(&manager).await;
        manager.subscribe(a, channel("room-1"), None).await;
        manager.subscribe(b, channel("room-1"), None).await;

        assert!(manager.disconnect(a).await);
        let after_first = manager.snapshot().await;
        assert!(!manager.disconnect(a).await);

        assert_eq!(manager.snapshot().await, after_first);
        assert_eq!(manager.connection_count().await, 1);
    }

    #[tokio::test]
    async fn disconnect_without_subscriptions_is_safe() {
        let manager = ChannelManager::new();
        let (id, _rx) = connect(&manager).await;

        assert!(manager.disconnect(id).await);
        assert!(!manager.disconnect(ConnectionId::new()).await);
        assert_eq!(manager.connection_count().await, 0);
    }

    #[tokio::test]
    async fn broadcast_reaches_all_members() {
        let manager = ChannelManager::new();
        let (a, mut rx_a) = connect(&manager).await;
        let (b, mut rx_b) = connect(&manager).await;
        manager.subscribe(a, channel("room-1"), None).await;
        manager.subscribe(b, channel("room-1"), None).await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        let message = json!({"type": "chat", "text": "hi"});
        let delivered = manager.broadcast(&channel("room-1"), &message).await;

        assert_eq!(delivered, 2);
        assert_eq!(drain(&mut rx_a), vec![message.clone()]);
        assert_eq!(drain(&mut rx_b), vec![message]);
    }

    #[tokio::test]
    async fn broadcast_skips_non_members() {
        let manager = ChannelManager::new();
        let (a, mut rx_a) = connect(&manager).await;
        let (_outsider, mut rx_out) = connect(&manager).await;
        let (c, mut rx_c) = connect(&manager).await;
        manager.subscribe(a, channel("room-1"), None).await;
        manager.subscribe(c, channel("room-2"), None).await;
        drain(&mut rx_a);
        drain(&mut rx_c);

        manager
            .broadcast(&channel("room-1"), &json!({"type": "chat"}))
            .await;

        assert_eq!(drain(&mut rx_a).len(), 1);
        assert!(drain(&mut rx_out).is_empty());
        assert!(drain(&mut rx_c).is_empty());
    }

    #[tokio::test]
    async fn broadcast_to_missing_channel_is_noop() {
        let manager = ChannelManager::new();
        let (_id, mut rx) = connect(&manager).await;

        let delivered = manager
            .broadcast(&channel("nowhere"), &json!({"type": "chat"}))
            .await;

        assert_eq!(delivered, 0);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn broadcast_after_last_member_disconnects_is_noop() {
        let manager = ChannelManager::new();
        let (a, _rx_a) = connect(&manager).await;
        manager.subscribe(a, channel("room-1"), None).await;

        manager.disconnect(a).await;

        assert!(manager.active_channels().await.is_empty());
        let delivered = manager
            .broadcast(&channel("room-1"), &json!({"type": "chat"}))
            .await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn broadcast_skips_closed_transports() {
        let manager = ChannelManager::new();
        let (a, rx_a) = connect(&manager).await;
        let (b, mut rx_b) = connect(&manager).await;
        manager.subscribe(a, channel("room-1"), None).await;
        manager.subscribe(b, channel("room-1"), None).await;
        drain(&mut rx_b);

        // Write side gone, registry not yet told.
        drop(rx_a);

        let delivered = manager
            .broadcast(&channel("room-1"), &json!({"type": "chat"}))
            .await;

        assert_eq!(delivered, 1);
        assert_eq!(drain(&mut rx_b).len(), 1);
        assert_eq!(manager.member_count(&channel("room-1")).await, 2);
    }

    #[tokio::test]
    async fn broadcast_to_all_reaches_connections_without_subscriptions() {
        let manager = ChannelManager::new();
        let (a, mut rx_a) = connect(&manager).await;
        let (_b, mut rx_b) = connect(&manager).await;
        manager.subscribe(a, channel("room-1"), None).await;
        drain(&mut rx_a);

        let notice = json!({
            "type": "system-notification",
            "level": "warning",
            "message": "Maintenance at 18:00"
        });
        let delivered = manager.broadcast_to_all(&notice).await;

        assert_eq!(delivered, 2);
        assert_eq!(drain(&mut rx_a), vec![notice.clone()]);
        assert_eq!(drain(&mut rx_b), vec![notice]);
    }

    #[tokio::test]
    async fn malformed_payload_produces_no_output() {
        let manager = ChannelManager::new();
        let (id, mut rx) = connect(&manager).await;

        manager.handle_message(id, "{not valid json").await;
        manager.handle_message(id, "42").await;
        manager
            .handle_message(id, r#"{"type":"subscribe","channel":["a"]}"#)
            .await;

        assert!(drain(&mut rx).is_empty());
        assert_eq!(manager.connection_count().await, 1);
        assert!(manager.active_channels().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_type_is_ignored() {
        let manager = ChannelManager::new();
        let (id, mut rx) = connect(&manager).await;

        manager
            .handle_message(id, r#"{"type":"chat","text":"hi"}"#)
            .await;

        assert!(drain(&mut rx).is_empty());
        assert!(manager.active_channels().await.is_empty());
    }

    #[tokio::test]
    async fn works_through_broadcaster_port() {
        let manager = Arc::new(ChannelManager::new());
        let (a, mut rx_a) = connect(&manager).await;
        manager.subscribe(a, channel("room-1"), None).await;
        drain(&mut rx_a);

        let port: Arc<dyn Broadcaster> = manager.clone();
        let delivered = port
            .broadcast(&channel("room-1"), json!({"type": "workflow-update"}))
            .await;

        assert_eq!(delivered, 1);
        assert_eq!(port.broadcast_to_all(json!({"type": "ping"})).await, 1);
        assert_eq!(drain(&mut rx_a).len(), 2);
    }

    #[tokio::test]
    async fn snapshot_is_sorted_by_name() {
        let manager = ChannelManager::new();
        let (a, _rx_a) = connect(&manager).await;
        let (b, _rx_b) = connect(&manager).await;
        manager.subscribe(a, channel("zeta"), None).await;
        manager.subscribe(a, channel("alpha"), None).await;
        manager.subscribe(b, channel("alpha"), None).await;

        assert_eq!(
            manager.snapshot().await,
            vec![(channel("alpha"), 2), (channel("zeta"), 1)]
        );
    }
}

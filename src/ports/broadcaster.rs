//! Broadcaster port - Interface for pushing messages to realtime clients.
//!
//! Application services publish through this port without knowing about
//! WebSocket connections or how channel membership is tracked.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::ChannelName;

/// Port for fanning messages out to connected clients.
///
/// Delivery is at-most-once and best-effort: connections whose transport is
/// no longer open are skipped, nothing is queued or retried, and no error is
/// reported to the caller. Both methods return how many connections the
/// message was handed to.
///
/// # Example
///
/// ```ignore
/// let channel = ChannelName::new("room-1")?;
/// let delivered = broadcaster.broadcast(&channel, json!({"type": "chat", "text": "hi"})).await;
/// ```
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Send `message` verbatim to every member of `channel`.
    ///
    /// A channel with no members is a no-op.
    async fn broadcast(&self, channel: &ChannelName, message: Value) -> usize;

    /// Send `message` verbatim to every connection, regardless of membership.
    async fn broadcast_to_all(&self, message: Value) -> usize;
}

//! Publishing application notifications to realtime clients.
//!
//! Producers (workflow transitions, achievement awards, operators posting
//! notices) build a [`Notification`] and hand it to [`NotificationService`],
//! which resolves the target and pushes it through the [`Broadcaster`] port.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::UserId;
use crate::domain::notification::{Achievement, Notification, NotificationLevel, NotificationTarget};
use crate::ports::Broadcaster;

/// Errors raised while publishing a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Failed to serialize {kind} notification: {source}")]
    Serialization {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Publishes notifications to the channels they target.
#[derive(Clone)]
pub struct NotificationService {
    broadcaster: Arc<dyn Broadcaster>,
}

impl NotificationService {
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { broadcaster }
    }

    /// Publish a notification to its target.
    ///
    /// Returns the number of connections it was handed to. Zero is not an
    /// error: nobody may be listening.
    pub async fn publish(&self, notification: Notification) -> Result<usize, NotificationError> {
        let kind = notification.kind();
        let target = notification.target();
        let payload = serde_json::to_value(&notification)
            .map_err(|source| NotificationError::Serialization { kind, source })?;

        let delivered = match &target {
            NotificationTarget::Channel(channel) => {
                self.broadcaster.broadcast(channel, payload).await
            }
            NotificationTarget::Everyone => self.broadcaster.broadcast_to_all(payload).await,
        };

        tracing::debug!(notification_type = kind, delivered, "Notification published");
        Ok(delivered)
    }

    /// Tell a user they earned an achievement, on their personal channel.
    pub async fn achievement_earned(
        &self,
        user_id: UserId,
        achievement: Achievement,
    ) -> Result<usize, NotificationError> {
        self.publish(Notification::achievement_earned(user_id, achievement))
            .await
    }

    /// Announce a workflow status change on the workflow's channel.
    pub async fn workflow_update(
        &self,
        workflow_id: impl Into<String>,
        status: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> Result<usize, NotificationError> {
        self.publish(Notification::workflow_update(workflow_id, status, data))
            .await
    }

    /// Push a notice to every connected client.
    pub async fn system_notification(
        &self,
        level: NotificationLevel,
        message: impl Into<String>,
        title: Option<String>,
    ) -> Result<usize, NotificationError> {
        self.publish(Notification::system(level, message, title)).await
    }
}

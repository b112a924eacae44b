//! Application-defined notification envelopes pushed over realtime channels.
//!
//! These are the payloads the workflow application broadcasts: achievement
//! awards, workflow status changes and system-wide notices. Each one knows
//! where it should be delivered (see [`Notification::target`]).

use serde::{Deserialize, Serialize};

use super::foundation::{ChannelName, Timestamp, UserId};

/// Severity of a system notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    #[default]
    Info,
    Warning,
    Error,
}

/// An achievement awarded to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload of an `achievement-earned` notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementEarned {
    pub user_id: UserId,
    pub achievement: Achievement,
    pub timestamp: Timestamp,
}

/// Payload of a `workflow-update` notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowUpdate {
    pub workflow_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub timestamp: Timestamp,
}

/// Payload of a `system-notification`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemNotification {
    pub level: NotificationLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub timestamp: Timestamp,
}

/// All notification envelopes, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notification {
    AchievementEarned(AchievementEarned),
    WorkflowUpdate(WorkflowUpdate),
    SystemNotification(SystemNotification),
}

/// Where a notification is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationTarget {
    /// Members of a single channel.
    Channel(ChannelName),
    /// Every open connection.
    Everyone,
}

impl Notification {
    pub fn achievement_earned(user_id: UserId, achievement: Achievement) -> Self {
        Self::AchievementEarned(AchievementEarned {
            user_id,
            achievement,
            timestamp: Timestamp::now(),
        })
    }

    pub fn workflow_update(
        workflow_id: impl Into<String>,
        status: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> Self {
        Self::WorkflowUpdate(WorkflowUpdate {
            workflow_id: workflow_id.into(),
            status: status.into(),
            data,
            timestamp: Timestamp::now(),
        })
    }

    pub fn system(level: NotificationLevel, message: impl Into<String>, title: Option<String>) -> Self {
        Self::SystemNotification(SystemNotification {
            level,
            message: message.into(),
            title,
            timestamp: Timestamp::now(),
        })
    }

    /// Achievements go to the user's personal channel, workflow updates to
    /// the workflow's channel, system notices to everyone.
    pub fn target(&self) -> NotificationTarget {
        match self {
            Self::AchievementEarned(n) => NotificationTarget::Channel(ChannelName::for_user(n.user_id)),
            Self::WorkflowUpdate(n) => {
                NotificationTarget::Channel(ChannelName::for_workflow(&n.workflow_id))
            }
            Self::SystemNotification(_) => NotificationTarget::Everyone,
        }
    }

    /// Wire `type` discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AchievementEarned(_) => "achievement-earned",
            Self::WorkflowUpdate(_) => "workflow-update",
            Self::SystemNotification(_) => "system-notification",
        }
    }
}

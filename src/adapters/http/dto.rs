//! Request and response DTOs for the realtime HTTP API.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ChannelName;
use crate::domain::notification::NotificationLevel;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to push a system-wide notification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemNotificationRequest {
    #[serde(default)]
    pub level: NotificationLevel,
    pub message: String,
    #[serde(default)]
    pub title: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Liveness probe response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// One channel in the statistics listing.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummary {
    pub name: String,
    pub members: usize,
}

impl From<(ChannelName, usize)> for ChannelSummary {
    fn from((name, members): (ChannelName, usize)) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }
}

/// Current connections and channel membership counts.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStatsResponse {
    pub connections: usize,
    pub channels: Vec<ChannelSummary>,
}

/// Outcome of a broadcast request.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastResponse {
    /// Connections the message was handed to.
    pub delivered: usize,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create an error response with details.
    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

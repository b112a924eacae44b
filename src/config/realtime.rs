//! Realtime (WebSocket) configuration

use serde::Deserialize;

use super::error::ValidationError;

const MAX_MESSAGE_BYTES_LIMIT: usize = 16 * 1024 * 1024;

/// WebSocket endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Path of the upgrade endpoint
    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    /// Largest inbound message accepted, in bytes
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl RealtimeConfig {
    /// Validate realtime configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.ws_path.starts_with('/') {
            return Err(ValidationError::InvalidWebSocketPath);
        }
        if self.ws_path == "/api" || self.ws_path.starts_with("/api/") {
            return Err(ValidationError::WebSocketPathCollidesWithApi);
        }
        if self.max_message_bytes == 0 || self.max_message_bytes > MAX_MESSAGE_BYTES_LIMIT {
            return Err(ValidationError::InvalidMaxMessageSize);
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            ws_path: default_ws_path(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

fn default_ws_path() -> String {
    "/ws".to_string()
}

fn default_max_message_bytes() -> usize {
    64 * 1024
}

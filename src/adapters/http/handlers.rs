//! HTTP handlers for the realtime API.
//!
//! These handlers let server-side producers inspect channels and publish
//! messages without holding a WebSocket themselves.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{json, Value};
use thiserror::Error;

use crate::adapters::websocket::ChannelManager;
use crate::application::{NotificationError, NotificationService};
use crate::domain::foundation::{ChannelName, InvalidChannelName};

use super::dto::{
    BroadcastResponse, ChannelStatsResponse, ChannelSummary, ErrorResponse, HealthResponse,
    SystemNotificationRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the realtime HTTP routes.
#[derive(Clone)]
pub struct ChannelsAppState {
    pub channel_manager: Arc<ChannelManager>,
    pub notifications: NotificationService,
}

impl ChannelsAppState {
    pub fn new(channel_manager: Arc<ChannelManager>) -> Self {
        Self {
            notifications: NotificationService::new(channel_manager.clone()),
            channel_manager,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/health - Liveness probe
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

/// GET /api/channels - Connection count and per-channel membership
pub async fn channel_stats(State(state): State<ChannelsAppState>) -> impl IntoResponse {
    let connections = state.channel_manager.connection_count().await;
    let channels = state
        .channel_manager
        .snapshot()
        .await
        .into_iter()
        .map(ChannelSummary::from)
        .collect();

    Json(ChannelStatsResponse {
        connections,
        channels,
    })
}

/// POST /api/channels/:channel/broadcast - Forward a payload to a channel
///
/// The body must be a JSON object with a string `type`; it is delivered
/// verbatim.
pub async fn broadcast_to_channel(
    State(state): State<ChannelsAppState>,
    Path(channel): Path<String>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let channel = ChannelName::new(channel)?;
    validate_payload(&payload)?;

    let delivered = state.channel_manager.broadcast(&channel, &payload).await;
    Ok(Json(BroadcastResponse { delivered }))
}

/// POST /api/notifications - Push a system notification to every connection
pub async fn post_system_notification(
    State(state): State<ChannelsAppState>,
    Json(request): Json<SystemNotificationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::EmptyMessage);
    }

    let delivered = state
        .notifications
        .system_notification(request.level, request.message, request.title)
        .await?;
    Ok(Json(BroadcastResponse { delivered }))
}

fn validate_payload(payload: &Value) -> Result<(), ApiError> {
    let fields = payload.as_object().ok_or(ApiError::PayloadNotObject)?;
    match fields.get("type") {
        Some(Value::String(kind)) if !kind.is_empty() => Ok(()),
        _ => Err(ApiError::MissingType),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// Errors returned by the realtime HTTP API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidChannel(#[from] InvalidChannelName),

    #[error("Payload must be a JSON object")]
    PayloadNotObject,

    #[error("Payload must carry a non-empty string 'type'")]
    MissingType,

    #[error("Notification message cannot be empty")]
    EmptyMessage,

    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code, details) = match &self {
            ApiError::InvalidChannel(_) => (
                StatusCode::BAD_REQUEST,
                "INVALID_CHANNEL",
                Some(json!({"field": "channel"})),
            ),
            ApiError::PayloadNotObject => (StatusCode::BAD_REQUEST, "INVALID_PAYLOAD", None),
            ApiError::MissingType => (
                StatusCode::BAD_REQUEST,
                "MISSING_TYPE",
                Some(json!({"field": "type"})),
            ),
            ApiError::EmptyMessage => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                Some(json!({"field": "message"})),
            ),
            ApiError::Notification(e) => {
                tracing::error!(error = %e, "Failed to publish notification");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None)
            }
        };

        let body = match details {
            Some(details) => ErrorResponse::with_details(error_code, self.to_string(), details),
            None => ErrorResponse::new(error_code, self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

//! Axum router configuration for the realtime service.
//!
//! Combines the REST routes and the WebSocket upgrade endpoint into one
//! application router with tracing, CORS and timeout layers.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{websocket_router, ChannelManager, WebSocketState};
use crate::config::{AppConfig, ServerConfig};

use super::handlers::{
    broadcast_to_channel, channel_stats, health_check, post_system_notification,
    ChannelsAppState,
};

/// Create the REST API router.
///
/// # Routes
/// - `GET /api/health` - Liveness probe
/// - `GET /api/channels` - Connection and channel statistics
/// - `POST /api/channels/:channel/broadcast` - Broadcast a payload to a channel
/// - `POST /api/notifications` - Broadcast a system notification to everyone
pub fn api_routes() -> Router<ChannelsAppState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/channels", get(channel_stats))
        .route("/api/channels/:channel/broadcast", post(broadcast_to_channel))
        .route("/api/notifications", post(post_system_notification))
}

/// Create the complete application router.
///
/// The REST routes get a request timeout; the WebSocket route does not, as
/// upgraded connections outlive the request.
pub fn app_router(config: &AppConfig, channel_manager: Arc<ChannelManager>) -> Router {
    let api: Router = api_routes()
        .with_state(ChannelsAppState::new(channel_manager.clone()))
        .layer(TimeoutLayer::new(config.server.request_timeout()));

    let ws: Router = websocket_router(&config.realtime.ws_path).with_state(WebSocketState::new(
        channel_manager,
        config.realtime.max_message_bytes,
    ));

    Router::new()
        .merge(api)
        .merge(ws)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server))
}

/// Permissive CORS when no origins are configured, otherwise the listed ones.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins = server.cors_origins_list();
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

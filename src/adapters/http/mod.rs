//! HTTP adapters - REST API and application router.
//!
//! Exposes the realtime service over HTTP:
//! - `GET /api/health` - Liveness probe
//! - `GET /api/channels` - Connection and channel statistics
//! - `POST /api/channels/:channel/broadcast` - Broadcast to a channel
//! - `POST /api/notifications` - System-wide notification
//!
//! The WebSocket endpoint itself lives in [`crate::adapters::websocket`] and
//! is mounted by [`app_router`].

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, ChannelsAppState};
pub use routes::{api_routes, app_router};

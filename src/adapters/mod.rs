//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to the outside world:
//! - `websocket` - Channel registry, wire protocol and upgrade handler
//! - `http` - REST endpoints and the combined application router

pub mod http;
pub mod websocket;

//! Assessor Live - Realtime channels for the assessor workflow application
//!
//! Clients hold a WebSocket, join named channels and receive what is
//! broadcast to them: workflow updates, achievements and system notices.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

//! Application layer - Use cases built on top of the ports.
//!
//! - `notifications` - Publishing achievement, workflow and system
//!   notifications to realtime clients

pub mod notifications;

pub use notifications::{NotificationError, NotificationService};

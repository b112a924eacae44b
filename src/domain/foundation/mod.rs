//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the realtime channel domain.

mod channel;
mod errors;
mod ids;
mod timestamp;

pub use channel::ChannelName;
pub use errors::InvalidChannelName;
pub use ids::{ConnectionId, UserId};
pub use timestamp::Timestamp;

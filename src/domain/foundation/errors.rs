//! Error types for the domain layer.

use thiserror::Error;

/// Errors that occur when constructing a [`ChannelName`](super::ChannelName).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidChannelName {
    #[error("Channel name cannot be empty")]
    Empty,
}

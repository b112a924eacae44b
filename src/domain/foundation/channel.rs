//! Channel name value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::InvalidChannelName;

/// Name of a broadcast channel.
///
/// Any non-empty string is a valid name. Channels are identified purely by
/// name; there is no namespace or hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelName(String);

impl ChannelName {
    /// Creates a channel name, rejecting the empty string.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidChannelName> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidChannelName::Empty);
        }
        Ok(Self(name))
    }

    /// Personal channel for a single user (`user-<id>`).
    pub fn for_user(user_id: super::UserId) -> Self {
        Self(format!("user-{}", user_id))
    }

    /// Channel carrying updates for one workflow (`workflow-<id>`).
    pub fn for_workflow(workflow_id: &str) -> Self {
        Self(format!("workflow-{}", workflow_id))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ChannelName {
    type Error = InvalidChannelName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ChannelName {
    type Error = InvalidChannelName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelName> for String {
    fn from(name: ChannelName) -> Self {
        name.0
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

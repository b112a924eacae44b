//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a WebSocket connection.
///
/// Generated server-side when a client connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Creates a new random ConnectionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric identifier of an application user.
///
/// Supplied by the client when subscribing; the realtime layer never
/// verifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates a UserId from its numeric value.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Reads a user id from any JSON number with no fractional part.
    ///
    /// Clients may send `17`, `17.0` or `1.7e1`; all map to `17`. Strings,
    /// fractions and out-of-range numbers yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let number = value.as_number()?;
        if let Some(id) = number.as_i64() {
            return Some(Self(id));
        }
        let float = number.as_f64()?;
        // i64::MAX as f64 rounds up to 2^63, which is out of range.
        let in_range = float >= i64::MIN as f64 && float < i64::MAX as f64;
        (float.fract() == 0.0 && in_range).then(|| Self(float as i64))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

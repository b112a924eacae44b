//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! - `Broadcaster` - Fan-out of messages to realtime channel members

mod broadcaster;

pub use broadcaster::Broadcaster;

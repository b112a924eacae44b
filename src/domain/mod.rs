//! Domain layer containing realtime domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `notification` - Application notification envelopes and their routing

pub mod foundation;
pub mod notification;

//! Shared types for the storefront order engine
//!
//! Common types used across crates: the unified error system, the API
//! response envelope, and the order/payment domain vocabulary.

pub mod error;
pub mod order;
pub mod response;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

//! Unified error system for the order engine
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`AppResult`]: Result alias used across service and handler layers
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog/voucher errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! // Create a simple error
//! let err = AppError::new(ErrorCode::OrderNotFound);
//!
//! // Create an error with details
//! let err = AppError::new(ErrorCode::InsufficientStock)
//!     .with_detail("variant_id", "product_variant:abc");
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};

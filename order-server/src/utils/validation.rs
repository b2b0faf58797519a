//! Input validation helpers
//!
//! Centralized text length constants and validation functions. Shape checks
//! run in the handlers, before any domain logic.

use shared::error::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Recipient names
pub const MAX_NAME_LEN: usize = 200;

/// Phone numbers
pub const MAX_PHONE_LEN: usize = 32;

/// Delivery addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Feedback text attached on receipt confirmation
pub const MAX_FEEDBACK_LEN: usize = 1000;

/// Voucher codes
pub const MAX_VOUCHER_CODE_LEN: usize = 64;

/// Record ids ("table:key" or bare keys)
pub const MAX_ID_LEN: usize = 64;

/// Maximum quantity per order line
pub const MAX_LINE_QUANTITY: i64 = 9999;

/// Maximum number of lines per order
pub const MAX_ORDER_LINES: usize = 100;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate an optional string, if present, against the length limit.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a line quantity: positive and within bounds.
pub fn validate_quantity(quantity: i64, field: &str) -> Result<(), AppError> {
    if quantity <= 0 {
        return Err(AppError::validation(format!(
            "{field} must be positive, got {quantity}"
        )));
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_LINE_QUANTITY}), got {quantity}"
        )));
    }
    Ok(())
}

/// Validate a 1-5 rating.
pub fn validate_rating(rating: u8) -> Result<(), AppError> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::validation(format!(
            "rating must be between 1 and 5, got {rating}"
        )));
    }
    Ok(())
}

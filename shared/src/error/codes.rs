//! Unified error codes for the order engine
//!
//! This module defines all error codes used across the server and its
//! clients. Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog/voucher errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed (malformed input shape)
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Status transition not allowed by the transition table
    InvalidStatusTransition = 4002,
    /// Order is already in a terminal status
    OrderAlreadyClosed = 4003,
    /// Order cannot be cancelled by the customer in its current state
    OrderNotCancellable = 4004,
    /// Receipt can only be confirmed for a delivered order
    OrderNotDelivered = 4005,
    /// Order contains no lines
    OrderEmpty = 4006,

    // ==================== 5xxx: Payment ====================
    /// Payment status transition not allowed
    InvalidPaymentTransition = 5001,
    /// Notified amount is less than the order total
    PaymentAmountMismatch = 5002,
    /// Order is not awaiting an online payment
    PaymentNotAwaiting = 5003,
    /// External payment id was already recorded (idempotency)
    TransactionAlreadyRecorded = 5004,

    // ==================== 6xxx: Catalog / Voucher ====================
    /// Product variant not found (or soft-deleted)
    ProductVariantNotFound = 6001,
    /// Requested quantity exceeds available stock
    InsufficientStock = 6002,
    /// Voucher code not found
    VoucherNotFound = 6101,
    /// Voucher is outside its validity window (or inactive)
    VoucherInvalidDate = 6102,
    /// Design not found
    DesignNotFound = 6201,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidStatusTransition => "Status transition is not allowed",
            ErrorCode::OrderAlreadyClosed => "Order is already in a terminal status",
            ErrorCode::OrderNotCancellable => "Order can no longer be cancelled",
            ErrorCode::OrderNotDelivered => "Order has not been delivered yet",
            ErrorCode::OrderEmpty => "Order contains no lines",

            // Payment
            ErrorCode::InvalidPaymentTransition => "Payment status transition is not allowed",
            ErrorCode::PaymentAmountMismatch => "Paid amount is less than the order total",
            ErrorCode::PaymentNotAwaiting => "Order is not awaiting an online payment",
            ErrorCode::TransactionAlreadyRecorded => "Payment notification was already recorded",

            // Catalog / Voucher
            ErrorCode::ProductVariantNotFound => "Product variant not found",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::VoucherNotFound => "Voucher not found",
            ErrorCode::VoucherInvalidDate => "Voucher is outside its validity window",
            ErrorCode::DesignNotFound => "Design not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            1 => ErrorCode::Unknown,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            4 => ErrorCode::AlreadyExists,
            5 => ErrorCode::InvalidRequest,
            8 => ErrorCode::ValueOutOfRange,
            4001 => ErrorCode::OrderNotFound,
            4002 => ErrorCode::InvalidStatusTransition,
            4003 => ErrorCode::OrderAlreadyClosed,
            4004 => ErrorCode::OrderNotCancellable,
            4005 => ErrorCode::OrderNotDelivered,
            4006 => ErrorCode::OrderEmpty,
            5001 => ErrorCode::InvalidPaymentTransition,
            5002 => ErrorCode::PaymentAmountMismatch,
            5003 => ErrorCode::PaymentNotAwaiting,
            5004 => ErrorCode::TransactionAlreadyRecorded,
            6001 => ErrorCode::ProductVariantNotFound,
            6002 => ErrorCode::InsufficientStock,
            6101 => ErrorCode::VoucherNotFound,
            6102 => ErrorCode::VoucherInvalidDate,
            6201 => ErrorCode::DesignNotFound,
            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::DatabaseError,
            9004 => ErrorCode::TimeoutError,
            9005 => ErrorCode::ConfigError,
            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

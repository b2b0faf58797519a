//! API Response types
//!
//! Standardized API response structure for the entire service.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Unified API response structure
///
/// All API responses follow this format:
/// ```json
/// {
///     "code": 0,
///     "message": "OK",
///     "data": { ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Error code (0 for success, non-zero for errors)
    pub code: u16,
    /// Human-readable message
    pub message: String,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Additional error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }

    /// Create an error response from an [`AppError`]
    pub fn error(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

impl ApiResponse<()> {
    /// Create a success response without data
    pub fn ok() -> Self {
        Self {
            code: 0,
            message: "OK".to_string(),
            data: None,
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_success_serialization() {
        let resp = ApiResponse::success(42);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["data"], 42);
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_error_carries_code_and_details() {
        let err = AppError::new(ErrorCode::InsufficientStock).with_detail("variant_id", "v1");
        let resp = ApiResponse::<()>::error(&err);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], 6002);
        assert_eq!(json["details"]["variant_id"], "v1");
        assert!(json.get("data").is_none());
    }
}

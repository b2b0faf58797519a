//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::ProductVariantNotFound
            | Self::VoucherNotFound
            | Self::DesignNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::InvalidStatusTransition
            | Self::OrderAlreadyClosed
            | Self::OrderNotCancellable
            | Self::OrderNotDelivered
            | Self::InvalidPaymentTransition
            | Self::PaymentNotAwaiting
            | Self::TransactionAlreadyRecorded => StatusCode::CONFLICT,

            // 422 Unprocessable Entity (domain invariant violations)
            Self::InsufficientStock
            | Self::VoucherInvalidDate
            | Self::PaymentAmountMismatch => StatusCode::UNPROCESSABLE_ENTITY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::VoucherNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflicts_map_to_409() {
        assert_eq!(
            ErrorCode::InvalidStatusTransition.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::TransactionAlreadyRecorded.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
    }
}

//! Checkout API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use shared::error::AppError;
use shared::order::{OrderLineRequest, PaymentMethod, Recipient};
use shared::response::ApiResponse;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::OrderDetail;
use crate::orders::checkout::CheckoutRequest;
use crate::utils::AppResult;
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_ID_LEN, MAX_NAME_LEN, MAX_ORDER_LINES, MAX_PHONE_LEN,
    MAX_VOUCHER_CODE_LEN, validate_quantity, validate_required_text,
};

/// Checkout payload
#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutPayload {
    #[validate(length(min = 1, max = 100, message = "order must have 1-100 lines"))]
    pub lines: Vec<OrderLineRequest>,
    #[serde(default)]
    pub voucher_codes: Vec<String>,
    pub recipient: Recipient,
    pub payment_method: PaymentMethod,
}

/// Shape checks, before any domain logic runs.
fn validate_payload(payload: &CheckoutPayload) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    debug_assert!(payload.lines.len() <= MAX_ORDER_LINES);

    for line in &payload.lines {
        validate_required_text(&line.variant_id, "variant_id", MAX_ID_LEN)?;
        validate_quantity(line.quantity, "quantity")?;
    }
    for code in &payload.voucher_codes {
        validate_required_text(code, "voucher_code", MAX_VOUCHER_CODE_LEN)?;
    }
    validate_required_text(&payload.recipient.name, "recipient.name", MAX_NAME_LEN)?;
    validate_required_text(&payload.recipient.phone, "recipient.phone", MAX_PHONE_LEN)?;
    validate_required_text(
        &payload.recipient.address,
        "recipient.address",
        MAX_ADDRESS_LEN,
    )?;
    Ok(())
}

/// Place an order
pub async fn place_order(
    State(state): State<ServerState>,
    Json(payload): Json<CheckoutPayload>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    validate_payload(&payload)?;

    let detail = state
        .checkout_service()
        .place_order(
            CheckoutRequest {
                lines: payload.lines,
                voucher_codes: payload.voucher_codes,
                recipient: payload.recipient,
                payment_method: payload.payment_method,
            },
            now_millis(),
        )
        .await?;
    Ok(Json(ApiResponse::success(detail)))
}

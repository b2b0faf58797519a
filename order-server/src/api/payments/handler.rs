//! Payment API Handlers

use axum::{Json, extract::State};
use shared::response::ApiResponse;

use crate::core::ServerState;
use crate::payments::{PaymentNotification, WebhookOutcome};
use crate::utils::AppResult;
use crate::utils::time::now_millis;

/// Inbound gateway notification
pub async fn webhook(
    State(state): State<ServerState>,
    Json(notification): Json<PaymentNotification>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    let outcome = state
        .payment_service()
        .handle(notification, now_millis())
        .await?;
    let label = match outcome {
        WebhookOutcome::Confirmed => "CONFIRMED",
        WebhookOutcome::Ignored => "IGNORED",
    };
    Ok(Json(ApiResponse::success(label)))
}

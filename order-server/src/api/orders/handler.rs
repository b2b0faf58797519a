//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::order::{OrderStatus, PaymentStatus};
use shared::response::ApiResponse;

use crate::core::ServerState;
use crate::db::models::{Order, OrderDetail};
use crate::db::repository::OrderRepository;
use crate::utils::AppResult;
use crate::utils::time::now_millis;
use crate::utils::validation::{MAX_FEEDBACK_LEN, validate_optional_text, validate_rating};

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// List orders (paginated, newest first)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let repo = OrderRepository::new(state.db.clone());
    let orders = repo.list(query.limit.clamp(1, 200), query.offset.max(0)).await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Get order detail by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let repo = OrderRepository::new(state.db.clone());
    let order = repo.find_by_id(&id).await?.ok_or_else(|| {
        AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id.clone())
    })?;
    let items = repo.find_items(&id).await?;
    Ok(Json(ApiResponse::success(OrderDetail { order, items })))
}

/// Staff status change payload
#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: OrderStatus,
}

/// Staff-driven status transition
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusPayload>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state
        .lifecycle_service()
        .staff_transition(&id, payload.status, now_millis())
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Staff payment-status change payload
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusPayload {
    pub payment_status: PaymentStatus,
}

/// Staff-driven payment status transition (e.g. REFUNDING -> REFUNDED)
pub async fn update_payment_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePaymentStatusPayload>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state
        .lifecycle_service()
        .staff_payment_transition(&id, payload.payment_status, now_millis())
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Customer cancellation
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state
        .lifecycle_service()
        .customer_cancel(&id, now_millis())
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Receipt confirmation payload
#[derive(Debug, Deserialize, Default)]
pub struct ConfirmReceivedPayload {
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
}

/// Customer receipt confirmation, with optional feedback and rating
pub async fn confirm_received(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ConfirmReceivedPayload>,
) -> AppResult<Json<ApiResponse<Order>>> {
    validate_optional_text(payload.feedback.as_deref(), "feedback", MAX_FEEDBACK_LEN)?;
    if let Some(rating) = payload.rating {
        validate_rating(rating)?;
    }

    let order = state
        .lifecycle_service()
        .confirm_received(&id, payload.feedback, payload.rating, now_millis())
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

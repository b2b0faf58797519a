//! Order API Module
//!
//! Reads plus the lifecycle mutations: staff status changes, customer
//! cancellation and receipt confirmation, staff payment-status changes.

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", get(handler::list))
        .route("/api/orders/{id}", get(handler::get_by_id))
        .route("/api/orders/{id}/status", patch(handler::update_status))
        .route(
            "/api/orders/{id}/payment-status",
            patch(handler::update_payment_status),
        )
        .route("/api/orders/{id}/cancel", post(handler::cancel))
        .route(
            "/api/orders/{id}/confirm-received",
            post(handler::confirm_received),
        )
}

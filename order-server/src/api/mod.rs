//! HTTP API
//!
//! Thin axum handlers over the services. Every response uses the
//! `ApiResponse` envelope; failures carry stable error codes with
//! structured details, never a stack trace.

pub mod checkout;
pub mod health;
pub mod orders;
pub mod payments;

use crate::core::ServerState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Assemble the full API router
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(checkout::router())
        .merge(orders::router())
        .merge(payments::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

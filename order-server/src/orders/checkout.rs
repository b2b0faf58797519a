//! Checkout service
//!
//! Read phase (bulk-load every referenced variant, voucher, design) → pure
//! pricing → one atomic write (stock debits + order + items + voucher
//! counters). Online orders get an expiry job scheduled after commit.

use crate::db::models::{OrderContent, OrderDetail};
use crate::db::repository::order::CheckoutWrite;
use crate::db::repository::{CatalogRepository, OrderRepository, VoucherRepository};
use crate::orders::PAYMENT_CODE_PREFIX;
use crate::orders::expiry::RestorationScheduler;
use crate::pricing::{PricingInput, PricingViolations, price_order};
use rand::Rng;
use rand::distributions::Alphanumeric;
use shared::error::{AppError, ErrorCode};
use shared::order::{OrderLineRequest, PaymentMethod, Recipient};
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Checkout input, validated for shape by the handler
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub lines: Vec<OrderLineRequest>,
    pub voucher_codes: Vec<String>,
    pub recipient: Recipient,
    pub payment_method: PaymentMethod,
}

/// Length of the random payment-code suffix
const PAYMENT_CODE_LEN: usize = 12;

fn generate_payment_code() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PAYMENT_CODE_LEN)
        .map(char::from)
        .collect();
    format!("{PAYMENT_CODE_PREFIX}{}", suffix.to_uppercase())
}

/// Turn aggregated pricing violations into the wire error: one category →
/// its own code, several → a general validation failure. Details always
/// carry every offending id per category.
fn violations_to_error(violations: PricingViolations) -> AppError {
    let mut categories: Vec<ErrorCode> = Vec::new();
    if !violations.variants_not_found.is_empty() {
        categories.push(ErrorCode::ProductVariantNotFound);
    }
    if !violations.insufficient_stock.is_empty() {
        categories.push(ErrorCode::InsufficientStock);
    }
    if !violations.vouchers_not_found.is_empty() {
        categories.push(ErrorCode::VoucherNotFound);
    }
    if !violations.vouchers_invalid_date.is_empty() {
        categories.push(ErrorCode::VoucherInvalidDate);
    }
    if !violations.designs_not_found.is_empty() {
        categories.push(ErrorCode::DesignNotFound);
    }

    let code = match categories.as_slice() {
        [single] => *single,
        _ => ErrorCode::ValidationFailed,
    };
    let mut err = AppError::new(code);
    if !violations.variants_not_found.is_empty() {
        err = err.with_detail(
            "variants_not_found",
            serde_json::json!(violations.variants_not_found),
        );
    }
    if !violations.insufficient_stock.is_empty() {
        let shortages: Vec<_> = violations
            .insufficient_stock
            .iter()
            .map(|s| {
                serde_json::json!({
                    "variant_id": s.variant_id,
                    "requested": s.requested,
                    "available": s.available,
                })
            })
            .collect();
        err = err.with_detail("insufficient_stock", serde_json::json!(shortages));
    }
    if !violations.vouchers_not_found.is_empty() {
        err = err.with_detail(
            "vouchers_not_found",
            serde_json::json!(violations.vouchers_not_found),
        );
    }
    if !violations.vouchers_invalid_date.is_empty() {
        err = err.with_detail(
            "vouchers_invalid_date",
            serde_json::json!(violations.vouchers_invalid_date),
        );
    }
    if !violations.designs_not_found.is_empty() {
        err = err.with_detail(
            "designs_not_found",
            serde_json::json!(violations.designs_not_found),
        );
    }
    err
}

/// Checkout service
#[derive(Clone)]
pub struct CheckoutService {
    catalog: CatalogRepository,
    vouchers: VoucherRepository,
    orders: OrderRepository,
    scheduler: Arc<dyn RestorationScheduler>,
    expiry_delay: Duration,
}

impl CheckoutService {
    pub fn new(
        db: Surreal<Db>,
        scheduler: Arc<dyn RestorationScheduler>,
        expiry_delay: Duration,
    ) -> Self {
        Self {
            catalog: CatalogRepository::new(db.clone()),
            vouchers: VoucherRepository::new(db.clone()),
            orders: OrderRepository::new(db),
            scheduler,
            expiry_delay,
        }
    }

    /// Place an order: validate, price, commit, schedule expiry.
    pub async fn place_order(
        &self,
        request: CheckoutRequest,
        now: i64,
    ) -> Result<OrderDetail, AppError> {
        if request.lines.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }

        // ── Read phase: single upfront load of everything referenced ──
        let variant_ids: Vec<String> = request
            .lines
            .iter()
            .map(|l| l.variant_id.clone())
            .collect();
        let design_ids: Vec<String> = request
            .lines
            .iter()
            .filter_map(|l| l.design_id.clone())
            .collect();

        let variants = self.catalog.find_variants_with_product(&variant_ids).await?;
        let vouchers = self.vouchers.find_by_codes(&request.voucher_codes).await?;
        let designs = self.catalog.find_existing_designs(&design_ids).await?;

        // ── Pure compute phase ──
        let input = PricingInput {
            variants: &variants,
            vouchers: &vouchers,
            existing_designs: &designs,
        };
        let priced = price_order(&input, &request.lines, &request.voucher_codes, now)
            .map_err(violations_to_error)?;

        // ── Atomic write phase ──
        let order_id = uuid::Uuid::new_v4().simple().to_string();
        let payment_code = generate_payment_code();
        let write = CheckoutWrite {
            order_id: order_id.clone(),
            order: OrderContent {
                payment_code,
                status: Default::default(),
                payment_status: request.payment_method.initial_payment_status(),
                payment_method: request.payment_method,
                recipient_name: request.recipient.name,
                recipient_phone: request.recipient.phone,
                recipient_address: request.recipient.address,
                subtotal: priced.subtotal,
                discount: priced.discount,
                total: priced.total,
                created_at: now,
                updated_at: now,
            },
            items: priced.items,
            stock_debits: priced.stock_debits,
            voucher_uses: priced.voucher_uses,
        };
        self.orders.create_with_items(write).await?;

        // Online orders expire if the gateway never confirms
        if request.payment_method == PaymentMethod::OnlinePayment {
            self.scheduler
                .schedule(order_id.clone(), self.expiry_delay)
                .await;
        }

        let detail = self.orders.find_detail(&order_id).await?;
        tracing::info!(
            %order_id,
            total = detail.order.total,
            method = ?detail.order.payment_method,
            "order placed"
        );
        Ok(detail)
    }
}

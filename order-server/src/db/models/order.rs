//! Order Model
//!
//! An order owns its item snapshots. Recipient and payment-method fields are
//! immutable after checkout; only the two status fields and the feedback
//! fields mutate over time. Orders are never hard-deleted.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::order::{OrderStatus, PaymentMethod, PaymentStatus};
use surrealdb::RecordId;

/// Order entity
///
/// Invariant: `total = subtotal - discount`, and the item lines sum to the
/// order's subtotal/discount/total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Unique token correlating gateway notifications back to this order
    pub payment_code: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_address: String,
    /// Sum of line subtotals (minor currency units)
    pub subtotal: i64,
    /// Sum of line discounts
    pub discount: i64,
    /// `subtotal - discount`
    pub total: i64,
    /// Post-delivery feedback, set by ConfirmReceived only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Post-delivery rating 1-5, set by ConfirmReceived only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order content for CREATE (id assigned by the transaction script)
#[derive(Debug, Clone, Serialize)]
pub struct OrderContent {
    pub payment_code: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_address: String,
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order item entity: an immutable priced snapshot of one line
///
/// Product name, SKU, image and unit price are copied at order time, so
/// later catalog edits do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub variant: RecordId,
    pub product_name: String,
    pub sku: String,
    pub image_url: String,
    /// Unit price at order time (minor currency units)
    pub unit_price: i64,
    pub quantity: i64,
    /// `unit_price * quantity`
    pub subtotal: i64,
    /// `discount_per_unit * quantity` for the winning voucher, else 0
    pub discount_amount: i64,
    /// `subtotal - discount_amount`
    pub total_amount: i64,
    /// Winning voucher, if any
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub voucher: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_code: Option<String>,
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub design: Option<RecordId>,
}

/// Order item content for CREATE inside the checkout transaction
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemContent {
    pub variant_id: String,
    pub product_name: String,
    pub sku: String,
    pub image_url: String,
    pub unit_price: i64,
    pub quantity: i64,
    pub subtotal: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
    pub voucher_id: Option<String>,
    pub voucher_code: Option<String>,
    pub design_id: Option<String>,
}

/// Order with its item snapshots (API read shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

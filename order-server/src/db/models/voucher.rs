//! Voucher Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::order::DiscountType;
use surrealdb::RecordId;

/// Voucher entity
///
/// Eligible now ⇔ `is_active` and the validity window contains `now`.
/// `used_count` is incremented once per order line the voucher wins; no
/// usage ceiling is enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Unique voucher code entered at checkout
    pub code: String,
    pub discount_type: DiscountType,
    /// Percent 0-100 for `PERCENT`, minor currency units for `FIXED_AMOUNT`
    pub value: i64,
    /// Validity window start (Unix millis, inclusive)
    pub starts_at: i64,
    /// Validity window end (Unix millis, inclusive)
    pub ends_at: i64,
    #[serde(default)]
    pub used_count: i64,
    #[serde(default)]
    pub is_active: bool,
    /// Eligible products
    #[serde(default)]
    pub products: Vec<RecordId>,
}

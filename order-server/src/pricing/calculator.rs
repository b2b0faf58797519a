//! Discount Calculator
//!
//! Per-unit discount math on integer minor-currency units.
//! Percent discounts round half away from zero
//! (`RoundingStrategy::MidpointAwayFromZero`); fixed discounts are clamped
//! so the discounted unit price never goes negative.

use crate::db::models::Voucher;
use rust_decimal::prelude::*;
use shared::order::DiscountType;

/// Per-unit discount for a percent voucher: `round(unit_price * pct / 100)`,
/// half away from zero.
pub fn percent_discount(unit_price: i64, percent: i64) -> i64 {
    let amount = Decimal::from(unit_price) * Decimal::from(percent) / Decimal::ONE_HUNDRED;
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Per-unit discount a voucher yields on a given unit price.
///
/// The result is always within `[0, unit_price]`.
pub fn discount_per_unit(unit_price: i64, voucher: &Voucher) -> i64 {
    let raw = match voucher.discount_type {
        DiscountType::Percent => percent_discount(unit_price, voucher.value),
        DiscountType::FixedAmount => voucher.value,
    };
    raw.clamp(0, unit_price)
}

//! Pricing Engine
//!
//! Two-phase order pricing: a validation pass that reports every offending
//! id at once (never fail-fast on the first), then a pure computation pass
//! that produces priced line snapshots, aggregate totals, and the
//! stock/voucher deltas for the write phase.

use crate::db::models::{OrderItemContent, VariantWithProduct, Voucher};
use crate::db::repository::strip_table_prefix;
use crate::pricing::matcher::{best_voucher_for, is_eligible_now, vouchers_by_product};
use shared::order::OrderLineRequest;
use std::collections::HashMap;
use thiserror::Error;

/// One over-stock violation: requested quantity summed across all lines
/// referencing the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortage {
    pub variant_id: String,
    pub requested: i64,
    pub available: i64,
}

/// Aggregated validation failure: every invalid id, grouped per category.
#[derive(Debug, Clone, Default, Error)]
#[error("order validation failed")]
pub struct PricingViolations {
    /// Variant absent, soft-deleted, or its product soft-deleted
    pub variants_not_found: Vec<String>,
    /// Requested quantity exceeds current stock
    pub insufficient_stock: Vec<StockShortage>,
    /// Unknown voucher codes
    pub vouchers_not_found: Vec<String>,
    /// Voucher window does not contain `now` (or voucher inactive)
    pub vouchers_invalid_date: Vec<String>,
    /// Referenced designs that do not exist
    pub designs_not_found: Vec<String>,
}

impl PricingViolations {
    pub fn is_empty(&self) -> bool {
        self.variants_not_found.is_empty()
            && self.insufficient_stock.is_empty()
            && self.vouchers_not_found.is_empty()
            && self.vouchers_invalid_date.is_empty()
            && self.designs_not_found.is_empty()
    }
}

/// Bulk-loaded catalog snapshot for one pricing run
#[derive(Debug)]
pub struct PricingInput<'a> {
    pub variants: &'a [VariantWithProduct],
    /// Vouchers resolved from the requested codes (any order)
    pub vouchers: &'a [Voucher],
    /// Design ids that exist (bare keys)
    pub existing_designs: &'a [String],
}

/// Priced order: line snapshots, aggregate totals, and the deltas the write
/// phase must apply atomically.
#[derive(Debug, Clone)]
pub struct PricedOrder {
    pub items: Vec<OrderItemContent>,
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
    /// (variant key, quantity): one debit per variant, lines summed
    pub stock_debits: Vec<(String, i64)>,
    /// (voucher key, uses): +1 per line the voucher won, not per unit
    pub voucher_uses: Vec<(String, i64)>,
}

/// Price an order. Pure: reads the snapshot, mutates nothing.
///
/// All violations are collected before failing, so the caller sees every
/// invalid id in one response.
pub fn price_order(
    input: &PricingInput<'_>,
    lines: &[OrderLineRequest],
    voucher_codes: &[String],
    now: i64,
) -> Result<PricedOrder, PricingViolations> {
    let mut violations = PricingViolations::default();

    // Index variants by bare key
    let variants: HashMap<String, &VariantWithProduct> = input
        .variants
        .iter()
        .filter_map(|v| v.id.as_ref().map(|id| (id.key().to_string(), v)))
        .collect();

    // ── Validation: variants ────────────────────────────────────────
    for line in lines {
        let key = strip_table_prefix("product_variant", &line.variant_id);
        let usable = variants
            .get(key)
            .map(|v| !v.is_deleted && !v.product.is_deleted)
            .unwrap_or(false);
        if !usable && !violations.variants_not_found.iter().any(|v| v == key) {
            violations.variants_not_found.push(key.to_string());
        }
    }

    // ── Validation: stock (quantity summed per variant) ─────────────
    let mut requested: Vec<(String, i64)> = Vec::new();
    for line in lines {
        let key = strip_table_prefix("product_variant", &line.variant_id).to_string();
        match requested.iter_mut().find(|(k, _)| *k == key) {
            Some((_, qty)) => *qty += line.quantity,
            None => requested.push((key, line.quantity)),
        }
    }
    for (key, qty) in &requested {
        if let Some(variant) = variants.get(key)
            && !variant.is_deleted
            && !variant.product.is_deleted
            && *qty > variant.stock
        {
            violations.insufficient_stock.push(StockShortage {
                variant_id: key.clone(),
                requested: *qty,
                available: variant.stock,
            });
        }
    }

    // ── Validation: vouchers (requested order preserved) ────────────
    let mut valid_vouchers: Vec<&Voucher> = Vec::new();
    for code in voucher_codes {
        match input.vouchers.iter().find(|v| &v.code == code) {
            None => violations.vouchers_not_found.push(code.clone()),
            Some(voucher) if !is_eligible_now(voucher, now) => {
                violations.vouchers_invalid_date.push(code.clone());
            }
            Some(voucher) => valid_vouchers.push(voucher),
        }
    }

    // ── Validation: designs ─────────────────────────────────────────
    for line in lines {
        if let Some(design_id) = &line.design_id {
            let key = strip_table_prefix("design", design_id);
            if !input.existing_designs.iter().any(|d| d == key)
                && !violations.designs_not_found.iter().any(|d| d == key)
            {
                violations.designs_not_found.push(key.to_string());
            }
        }
    }

    if !violations.is_empty() {
        return Err(violations);
    }

    // ── Computation: voucher selection per line, independently ──────
    let by_product = vouchers_by_product(&valid_vouchers);
    let no_candidates: Vec<&Voucher> = Vec::new();

    let mut items = Vec::with_capacity(lines.len());
    let mut subtotal = 0i64;
    let mut discount = 0i64;
    let mut voucher_uses: Vec<(String, i64)> = Vec::new();

    for line in lines {
        let key = strip_table_prefix("product_variant", &line.variant_id);
        let variant = variants[key];
        let product_key = variant
            .product
            .id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default();

        let candidates = by_product.get(&product_key).unwrap_or(&no_candidates);
        let winner = best_voucher_for(variant.price, candidates);

        let line_subtotal = variant.price * line.quantity;
        let (voucher_id, voucher_code, line_discount) = match winner {
            Some((voucher, per_unit)) => {
                let voucher_key = voucher
                    .id
                    .as_ref()
                    .map(|id| id.key().to_string())
                    .unwrap_or_default();
                match voucher_uses.iter_mut().find(|(k, _)| *k == voucher_key) {
                    Some((_, uses)) => *uses += 1,
                    None => voucher_uses.push((voucher_key.clone(), 1)),
                }
                (
                    Some(voucher_key),
                    Some(voucher.code.clone()),
                    per_unit * line.quantity,
                )
            }
            None => (None, None, 0),
        };

        subtotal += line_subtotal;
        discount += line_discount;

        items.push(OrderItemContent {
            variant_id: key.to_string(),
            product_name: variant.product.name.clone(),
            sku: variant.sku.clone(),
            image_url: variant.product.image_url.clone(),
            unit_price: variant.price,
            quantity: line.quantity,
            subtotal: line_subtotal,
            discount_amount: line_discount,
            total_amount: line_subtotal - line_discount,
            voucher_id,
            voucher_code,
            design_id: line
                .design_id
                .as_ref()
                .map(|d| strip_table_prefix("design", d).to_string()),
        });
    }

    Ok(PricedOrder {
        items,
        subtotal,
        discount,
        total: subtotal - discount,
        stock_debits: requested,
        voucher_uses,
    })
}

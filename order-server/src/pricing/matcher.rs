//! Voucher Matcher
//!
//! Eligibility checks and per-line best-voucher selection.

use crate::db::models::Voucher;
use crate::pricing::calculator::discount_per_unit;
use std::collections::HashMap;

/// A voucher is eligible now iff it is active and its validity window
/// (inclusive on both ends) contains `now`.
pub fn is_eligible_now(voucher: &Voucher, now: i64) -> bool {
    voucher.is_active && voucher.starts_at <= now && now <= voucher.ends_at
}

/// Build the product → vouchers map, preserving the given voucher order.
///
/// The order matters: ties during selection keep the first-seen voucher.
pub fn vouchers_by_product<'a>(vouchers: &[&'a Voucher]) -> HashMap<String, Vec<&'a Voucher>> {
    let mut map: HashMap<String, Vec<&'a Voucher>> = HashMap::new();
    for voucher in vouchers {
        for product in &voucher.products {
            map.entry(product.key().to_string())
                .or_default()
                .push(voucher);
        }
    }
    map
}

/// Select the voucher yielding the lowest resulting unit price.
///
/// Returns the winner and its per-unit discount, or `None` when no candidate
/// strictly beats the undiscounted price (a zero-discount voucher is not
/// applied). Ties keep the first-seen candidate.
pub fn best_voucher_for<'a>(
    unit_price: i64,
    candidates: &[&'a Voucher],
) -> Option<(&'a Voucher, i64)> {
    let mut best: Option<(&'a Voucher, i64)> = None;
    let mut best_price = unit_price;

    for voucher in candidates {
        let discount = discount_per_unit(unit_price, voucher);
        let resulting = unit_price - discount;
        if resulting < best_price {
            best_price = resulting;
            best = Some((voucher, discount));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::DiscountType;
    use surrealdb::RecordId;

    fn make_voucher(
        key: &str,
        discount_type: DiscountType,
        value: i64,
        products: &[&str],
    ) -> Voucher {
        Voucher {
            id: Some(RecordId::from_table_key("voucher", key)),
            code: key.to_uppercase(),
            discount_type,
            value,
            starts_at: 1_000,
            ends_at: 2_000,
            used_count: 0,
            is_active: true,
            products: products
                .iter()
                .map(|p| RecordId::from_table_key("product", *p))
                .collect(),
        }
    }

    #[test]
    fn test_eligibility_window_inclusive() {
        let v = make_voucher("v1", DiscountType::Percent, 10, &[]);
        assert!(is_eligible_now(&v, 1_000));
        assert!(is_eligible_now(&v, 1_500));
        assert!(is_eligible_now(&v, 2_000));
        assert!(!is_eligible_now(&v, 999));
        assert!(!is_eligible_now(&v, 2_001));
    }

    #[test]
    fn test_inactive_voucher_not_eligible() {
        let mut v = make_voucher("v1", DiscountType::Percent, 10, &[]);
        v.is_active = false;
        assert!(!is_eligible_now(&v, 1_500));
    }

    #[test]
    fn test_vouchers_by_product_preserves_order() {
        let v1 = make_voucher("v1", DiscountType::Percent, 10, &["p1", "p2"]);
        let v2 = make_voucher("v2", DiscountType::Percent, 20, &["p1"]);
        let map = vouchers_by_product(&[&v1, &v2]);

        let p1 = &map["p1"];
        assert_eq!(p1.len(), 2);
        assert_eq!(p1[0].code, "V1");
        assert_eq!(p1[1].code, "V2");
        assert_eq!(map["p2"].len(), 1);
    }

    #[test]
    fn test_best_voucher_picks_lowest_price() {
        let small = make_voucher("v1", DiscountType::Percent, 10, &["p1"]);
        let big = make_voucher("v2", DiscountType::FixedAmount, 250, &["p1"]);

        let (winner, discount) = best_voucher_for(1000, &[&small, &big]).unwrap();
        assert_eq!(winner.code, "V2");
        assert_eq!(discount, 250);
    }

    #[test]
    fn test_best_voucher_tie_keeps_first_seen() {
        // 10% of 1000 and fixed 100 both leave 900
        let pct = make_voucher("v1", DiscountType::Percent, 10, &["p1"]);
        let fixed = make_voucher("v2", DiscountType::FixedAmount, 100, &["p1"]);

        let (winner, _) = best_voucher_for(1000, &[&pct, &fixed]).unwrap();
        assert_eq!(winner.code, "V1");

        // Reversed input order flips the winner
        let (winner, _) = best_voucher_for(1000, &[&fixed, &pct]).unwrap();
        assert_eq!(winner.code, "V2");
    }

    #[test]
    fn test_zero_discount_not_applied() {
        let zero = make_voucher("v1", DiscountType::Percent, 0, &["p1"]);
        assert!(best_voucher_for(1000, &[&zero]).is_none());
    }

    #[test]
    fn test_no_candidates() {
        assert!(best_voucher_for(1000, &[]).is_none());
    }
}

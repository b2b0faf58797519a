//! Product and Variant Models

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    pub image_url: String,
    /// Soft-delete flag; deleted products cannot be ordered
    #[serde(default)]
    pub is_deleted: bool,
}

/// Product variant entity: the purchasable SKU
///
/// `stock` never goes negative; it is mutated only by the checkout debit and
/// the compensation credit, both inside the order transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub sku: String,
    /// Unit price in minor currency units
    pub price: i64,
    /// Units on hand
    pub stock: i64,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Variant with its product fetched (read phase of checkout)
#[derive(Debug, Clone, Deserialize)]
pub struct VariantWithProduct {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub product: Product,
    pub sku: String,
    pub price: i64,
    pub stock: i64,
    #[serde(default)]
    pub is_deleted: bool,
}

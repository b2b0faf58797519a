//! Payment Transaction Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Immutable record of a confirmed inbound payment notification
///
/// The record key is the gateway's external payment id, which makes the
/// duplicate check a plain key collision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransaction {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order: RecordId,
    pub gateway: String,
    pub account_number: String,
    /// Notified amount (minor currency units)
    pub amount: i64,
    pub content: String,
    /// Gateway-reported transaction date, stored verbatim
    pub transaction_date: String,
    pub recorded_at: i64,
}

/// Transaction content for CREATE inside the confirmation transaction
#[derive(Debug, Clone, Serialize)]
pub struct PaymentTransactionContent {
    pub order_id: String,
    pub gateway: String,
    pub account_number: String,
    pub amount: i64,
    pub content: String,
    pub transaction_date: String,
    pub recorded_at: i64,
}

//! Shared order wire types

use serde::{Deserialize, Serialize};

/// One requested order line, as submitted at checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLineRequest {
    /// Product variant ID
    pub variant_id: String,
    /// Requested quantity
    pub quantity: i64,
    /// Optional design reference (customized items)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_id: Option<String>,
}

/// Recipient fields, immutable after checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub phone: String,
    pub address: String,
}

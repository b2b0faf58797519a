//! Design Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Customer design referenced by an order line
///
/// Design CRUD lives outside this core; only existence is checked here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
}

//! Payment Transaction Repository
//!
//! Read-only: transaction rows are written by
//! [`OrderRepository::confirm_payment`](super::OrderRepository::confirm_payment)
//! inside the confirmation transaction and never mutated afterwards.

use super::{BaseRepository, RepoResult};
use crate::db::models::PaymentTransaction;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "payment_transaction";

#[derive(Clone)]
pub struct TransactionRepository {
    base: BaseRepository,
}

impl TransactionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Look up a recorded notification by the gateway's external id.
    pub async fn find_by_external_id(&self, id: &str) -> RepoResult<Option<PaymentTransaction>> {
        let txn: Option<PaymentTransaction> =
            self.base.db().select((TABLE, id.to_string())).await?;
        Ok(txn)
    }

    /// All recorded notifications for an order.
    pub async fn find_for_order(&self, order_id: &str) -> RepoResult<Vec<PaymentTransaction>> {
        let thing = surrealdb::RecordId::from_table_key("order", order_id);
        let txns: Vec<PaymentTransaction> = self
            .base
            .db()
            .query("SELECT * FROM payment_transaction WHERE `order` = $ord")
            .bind(("ord", thing))
            .await?
            .take(0)?;
        Ok(txns)
    }
}

//! Order Repository
//!
//! All order mutations run as single transaction scripts that re-read the
//! rows they touch and `THROW` a guard marker when an invariant no longer
//! holds, so two racing writers cannot both get past a stale check.

use super::{
    BaseRepository, GUARD_DUPLICATE_TRANSACTION, GUARD_INSUFFICIENT_STOCK, GUARD_NOT_AWAITING,
    GUARD_STATUS_CHANGED, RepoError, RepoResult, check_script, strip_table_prefix,
};
use crate::db::models::{
    Order, OrderContent, OrderDetail, OrderItem, OrderItemContent, PaymentTransactionContent,
};
use serde_json::Value;
use shared::order::{OrderStatus, PaymentStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const ORDER_TABLE: &str = "order";

/// Checkout write unit: order + items + stock debits + voucher counters,
/// committed atomically.
#[derive(Debug)]
pub struct CheckoutWrite {
    /// Bare order record key
    pub order_id: String,
    pub order: OrderContent,
    pub items: Vec<OrderItemContent>,
    /// (variant key, quantity): one debit per variant, lines summed
    pub stock_debits: Vec<(String, i64)>,
    /// (voucher key, uses): one increment per line the voucher won
    pub voucher_uses: Vec<(String, i64)>,
}

/// Status transition write unit
#[derive(Debug)]
pub struct TransitionWrite {
    /// Bare order record key
    pub order_id: String,
    /// Status observed by the caller; the script re-checks it under the lock
    pub expected_status: OrderStatus,
    pub new_status: OrderStatus,
    /// Payment compensation flip, when the transition demands one
    pub new_payment_status: Option<PaymentStatus>,
    /// Feedback attached by ConfirmReceived
    pub feedback: Option<String>,
    /// Rating attached by ConfirmReceived
    pub rating: Option<u8>,
    /// Credit every line's quantity back to its variant
    pub restore_stock: bool,
    pub now: i64,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // ==================== Reads ====================

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let key = strip_table_prefix(ORDER_TABLE, id).to_string();
        let order: Option<Order> = self.base.db().select((ORDER_TABLE, key)).await?;
        Ok(order)
    }

    pub async fn find_by_payment_code(&self, code: &str) -> RepoResult<Option<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE payment_code = $code LIMIT 1")
            .bind(("code", code.to_string()))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    pub async fn find_items(&self, order_id: &str) -> RepoResult<Vec<OrderItem>> {
        let key = strip_table_prefix(ORDER_TABLE, order_id);
        let thing = surrealdb::RecordId::from_table_key(ORDER_TABLE, key);
        let items: Vec<OrderItem> = self
            .base
            .db()
            .query("SELECT * FROM order_item WHERE `order` = $ord")
            .bind(("ord", thing))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Order with its items; `NotFound` if the order does not exist.
    pub async fn find_detail(&self, order_id: &str) -> RepoResult<OrderDetail> {
        let order = self
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("order {order_id}")))?;
        let items = self.find_items(order_id).await?;
        Ok(OrderDetail { order, items })
    }

    /// List orders, newest first.
    pub async fn list(&self, limit: i64, offset: i64) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order ORDER BY created_at DESC LIMIT $limit START $offset")
            .bind(("limit", limit))
            .bind(("offset", offset))
            .await?
            .take(0)?;
        Ok(orders)
    }

    // ==================== Checkout write ====================

    /// Commit a priced order: debit stock, create the order and its item
    /// snapshots, bump voucher counters. One transaction; a stock re-check
    /// failure rolls everything back with [`GUARD_INSUFFICIENT_STOCK`].
    pub async fn create_with_items(&self, write: CheckoutWrite) -> RepoResult<()> {
        let mut script = String::from("BEGIN TRANSACTION;\n");
        let mut params: Vec<(String, Value)> = Vec::new();

        // Stock debits, re-checked under the row lock
        for (i, (variant_id, quantity)) in write.stock_debits.iter().enumerate() {
            script.push_str(&format!(
                "LET $v{i} = (UPDATE ONLY type::thing('product_variant', $d{i}_id) \
                 SET stock -= $d{i}_qty RETURN AFTER);\n\
                 IF $v{i}.stock < 0 {{ THROW '{GUARD_INSUFFICIENT_STOCK}' }};\n"
            ));
            params.push((format!("d{i}_id"), Value::from(variant_id.clone())));
            params.push((format!("d{i}_qty"), Value::from(*quantity)));
        }

        // Order row
        script.push_str(
            "LET $created = (CREATE ONLY type::thing('order', $order_id) CONTENT $order_content);\n",
        );
        params.push(("order_id".into(), Value::from(write.order_id.clone())));
        params.push((
            "order_content".into(),
            serde_json::to_value(&write.order)
                .map_err(|e| RepoError::Database(format!("serialize order: {e}")))?,
        ));

        // Item snapshots; voucher/design links resolved only when present
        for (i, item) in write.items.iter().enumerate() {
            script.push_str(&format!(
                "LET $voucher{i} = IF $it{i}.voucher_id \
                 {{ type::thing('voucher', $it{i}.voucher_id) }} ELSE {{ NONE }};\n\
                 LET $design{i} = IF $it{i}.design_id \
                 {{ type::thing('design', $it{i}.design_id) }} ELSE {{ NONE }};\n\
                 CREATE order_item SET \
                 `order` = $created.id, \
                 variant = type::thing('product_variant', $it{i}.variant_id), \
                 product_name = $it{i}.product_name, \
                 sku = $it{i}.sku, \
                 image_url = $it{i}.image_url, \
                 unit_price = $it{i}.unit_price, \
                 quantity = $it{i}.quantity, \
                 subtotal = $it{i}.subtotal, \
                 discount_amount = $it{i}.discount_amount, \
                 total_amount = $it{i}.total_amount, \
                 voucher = $voucher{i}, \
                 voucher_code = $it{i}.voucher_code, \
                 design = $design{i};\n"
            ));
            params.push((
                format!("it{i}"),
                serde_json::to_value(item)
                    .map_err(|e| RepoError::Database(format!("serialize item: {e}")))?,
            ));
        }

        // Voucher usage counters
        for (i, (voucher_id, uses)) in write.voucher_uses.iter().enumerate() {
            script.push_str(&format!(
                "UPDATE type::thing('voucher', $u{i}_id) SET used_count += $u{i}_n;\n"
            ));
            params.push((format!("u{i}_id"), Value::from(voucher_id.clone())));
            params.push((format!("u{i}_n"), Value::from(*uses)));
        }

        script.push_str("COMMIT TRANSACTION;");

        let mut query = self.base.db().query(script);
        for (key, value) in params {
            query = query.bind((key, value));
        }
        check_script(query.await?)?;
        Ok(())
    }

    // ==================== Transition write ====================

    /// Apply a status transition with its compensation effects. The script
    /// re-reads the order and throws [`GUARD_STATUS_CHANGED`] if the status
    /// moved since the caller looked at it.
    pub async fn apply_transition(&self, write: TransitionWrite) -> RepoResult<()> {
        let mut script = String::from(
            "BEGIN TRANSACTION;\n\
             LET $ord = (SELECT * FROM ONLY type::thing('order', $order_id));\n",
        );
        script.push_str(&format!(
            "IF $ord.status != $expected_status {{ THROW '{GUARD_STATUS_CHANGED}' }};\n"
        ));

        let mut set_clause = String::from("status = $new_status, updated_at = $now");
        if write.new_payment_status.is_some() {
            set_clause.push_str(", payment_status = $new_payment_status");
        }
        if write.feedback.is_some() {
            set_clause.push_str(", feedback = $feedback");
        }
        if write.rating.is_some() {
            set_clause.push_str(", rating = $rating");
        }
        script.push_str(&format!(
            "UPDATE type::thing('order', $order_id) SET {set_clause};\n"
        ));

        if write.restore_stock {
            script.push_str(
                "LET $items = (SELECT * FROM order_item WHERE `order` = type::thing('order', $order_id));\n\
                 FOR $it IN $items { UPDATE $it.variant SET stock += $it.quantity; };\n",
            );
        }
        script.push_str("COMMIT TRANSACTION;");

        let mut query = self
            .base
            .db()
            .query(script)
            .bind(("order_id", write.order_id))
            .bind(("expected_status", write.expected_status))
            .bind(("new_status", write.new_status))
            .bind(("now", write.now));
        if let Some(ps) = write.new_payment_status {
            query = query.bind(("new_payment_status", ps));
        }
        if let Some(feedback) = write.feedback {
            query = query.bind(("feedback", feedback));
        }
        if let Some(rating) = write.rating {
            query = query.bind(("rating", rating));
        }
        check_script(query.await?)?;
        Ok(())
    }

    /// Expire an unpaid online order: only fires while the order is still
    /// `PENDING` / `ONLINE_PAYMENT_AWAITING`; restores stock from the item
    /// snapshots. Returns `false` (no-op) when another path got there first.
    pub async fn expire_if_awaiting(&self, order_id: &str, now: i64) -> RepoResult<bool> {
        let script = format!(
            "BEGIN TRANSACTION;\n\
             LET $ord = (SELECT * FROM ONLY type::thing('order', $order_id));\n\
             IF $ord.status != 'PENDING' OR $ord.payment_status != 'ONLINE_PAYMENT_AWAITING' \
             {{ THROW '{GUARD_STATUS_CHANGED}' }};\n\
             UPDATE type::thing('order', $order_id) SET status = 'EXPIRED', updated_at = $now;\n\
             LET $items = (SELECT * FROM order_item WHERE `order` = type::thing('order', $order_id));\n\
             FOR $it IN $items {{ UPDATE $it.variant SET stock += $it.quantity; }};\n\
             COMMIT TRANSACTION;"
        );

        let response = self
            .base
            .db()
            .query(script)
            .bind(("order_id", order_id.to_string()))
            .bind(("now", now))
            .await?;

        match check_script(response) {
            Ok(_) => Ok(true),
            Err(RepoError::Guard(GUARD_STATUS_CHANGED)) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Update the payment status alone, guarded on the status the caller
    /// observed.
    pub async fn update_payment_status(
        &self,
        order_id: &str,
        expected: PaymentStatus,
        new: PaymentStatus,
        now: i64,
    ) -> RepoResult<()> {
        let script = format!(
            "BEGIN TRANSACTION;\n\
             LET $ord = (SELECT * FROM ONLY type::thing('order', $order_id));\n\
             IF $ord.payment_status != $expected {{ THROW '{GUARD_STATUS_CHANGED}' }};\n\
             UPDATE type::thing('order', $order_id) SET payment_status = $new, updated_at = $now;\n\
             COMMIT TRANSACTION;"
        );
        let response = self
            .base
            .db()
            .query(script)
            .bind(("order_id", order_id.to_string()))
            .bind(("expected", expected))
            .bind(("new", new))
            .bind(("now", now))
            .await?;
        check_script(response)?;
        Ok(())
    }

    // ==================== Payment confirmation write ====================

    /// Confirm an online payment: flips `ONLINE_PAYMENT_AWAITING` →
    /// `ONLINE_PAYMENT_PAID` and records the transaction row keyed by the
    /// gateway's external id. A repeated external id throws
    /// [`GUARD_DUPLICATE_TRANSACTION`]; a non-awaiting order throws
    /// [`GUARD_NOT_AWAITING`].
    pub async fn confirm_payment(
        &self,
        order_id: &str,
        external_id: &str,
        transaction: PaymentTransactionContent,
        now: i64,
    ) -> RepoResult<()> {
        let script = format!(
            "BEGIN TRANSACTION;\n\
             LET $ord = (SELECT * FROM ONLY type::thing('order', $order_id));\n\
             IF $ord.payment_status != 'ONLINE_PAYMENT_AWAITING' {{ THROW '{GUARD_NOT_AWAITING}' }};\n\
             LET $existing = (SELECT * FROM ONLY type::thing('payment_transaction', $external_id));\n\
             IF $existing {{ THROW '{GUARD_DUPLICATE_TRANSACTION}' }};\n\
             UPDATE type::thing('order', $order_id) \
             SET payment_status = 'ONLINE_PAYMENT_PAID', updated_at = $now;\n\
             CREATE ONLY type::thing('payment_transaction', $external_id) SET \
             `order` = type::thing('order', $order_id), \
             gateway = $txn.gateway, \
             account_number = $txn.account_number, \
             amount = $txn.amount, \
             content = $txn.content, \
             transaction_date = $txn.transaction_date, \
             recorded_at = $txn.recorded_at;\n\
             COMMIT TRANSACTION;"
        );

        let response = self
            .base
            .db()
            .query(script)
            .bind(("order_id", order_id.to_string()))
            .bind(("external_id", external_id.to_string()))
            .bind((
                "txn",
                serde_json::to_value(&transaction)
                    .map_err(|e| RepoError::Database(format!("serialize transaction: {e}")))?,
            ))
            .bind(("now", now))
            .await?;
        check_script(response)?;
        Ok(())
    }
}

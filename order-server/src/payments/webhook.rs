//! Payment webhook handler
//!
//! Consumes the gateway's notification shape verbatim. Only inbound
//! transfers whose code carries the order prefix are handled here; other
//! shapes are acknowledged without action (token-package purchases and the
//! like are routed to sibling handlers outside this module).

use crate::db::models::{Order, PaymentTransactionContent};
use crate::db::repository::OrderRepository;
use crate::orders::PAYMENT_CODE_PREFIX;
use crate::orders::expiry::RestorationScheduler;
use crate::orders::transitions::can_transition_payment;
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::order::PaymentStatus;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Inbound transfers carry this transfer type; everything else is ignored.
const TRANSFER_TYPE_IN: &str = "in";

/// Gateway notification, field-for-field as the gateway posts it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNotification {
    /// Gateway-unique payment id (idempotency key)
    pub id: String,
    /// Correlation code typed by the payer; `ORD-…` codes belong to orders
    pub code: String,
    pub transfer_type: String,
    /// Notified amount in minor currency units
    pub transfer_amount: i64,
    pub gateway: String,
    pub account_number: String,
    pub content: String,
    pub transaction_date: String,
}

/// Outcome of a webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Payment confirmed and recorded
    Confirmed,
    /// Notification acknowledged but not for this module (wrong transfer
    /// type or foreign code prefix)
    Ignored,
}

/// Preconditions on the matched order, checked before any write. Pure.
pub fn validate_confirmation(order: &Order, amount: i64) -> Result<(), AppError> {
    if order.payment_status != PaymentStatus::OnlinePaymentAwaiting {
        return Err(AppError::new(ErrorCode::PaymentNotAwaiting)
            .with_detail("payment_status", format!("{:?}", order.payment_status)));
    }
    can_transition_payment(order.payment_status, PaymentStatus::OnlinePaymentPaid).map_err(
        |e| AppError::with_message(ErrorCode::InvalidPaymentTransition, e.to_string()),
    )?;
    if amount < order.total {
        return Err(AppError::new(ErrorCode::PaymentAmountMismatch)
            .with_detail("notified", amount)
            .with_detail("required", order.total));
    }
    Ok(())
}

/// Payment confirmation service
#[derive(Clone)]
pub struct PaymentConfirmationService {
    orders: OrderRepository,
    scheduler: Arc<dyn RestorationScheduler>,
}

impl PaymentConfirmationService {
    pub fn new(db: Surreal<Db>, scheduler: Arc<dyn RestorationScheduler>) -> Self {
        Self {
            orders: OrderRepository::new(db),
            scheduler,
        }
    }

    /// Handle one notification.
    ///
    /// Idempotency: the confirmation transaction keys the recorded row by
    /// the gateway's external id, so a retried webhook fails with
    /// `TRANSACTION_ALREADY_RECORDED` and never double-credits.
    pub async fn handle(
        &self,
        notification: PaymentNotification,
        now: i64,
    ) -> Result<WebhookOutcome, AppError> {
        if notification.transfer_type != TRANSFER_TYPE_IN {
            tracing::debug!(id = %notification.id, "ignoring outbound transfer");
            return Ok(WebhookOutcome::Ignored);
        }
        if !notification.code.starts_with(PAYMENT_CODE_PREFIX) {
            tracing::debug!(
                id = %notification.id,
                code = %notification.code,
                "ignoring foreign correlation code"
            );
            return Ok(WebhookOutcome::Ignored);
        }

        let order = self
            .orders
            .find_by_payment_code(&notification.code)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::OrderNotFound)
                    .with_detail("payment_code", notification.code.clone())
            })?;

        validate_confirmation(&order, notification.transfer_amount)?;

        let order_key = order
            .id
            .as_ref()
            .map(|id| id.key().to_string())
            .ok_or_else(|| AppError::internal("order row missing id"))?;

        self.orders
            .confirm_payment(
                &order_key,
                &notification.id,
                PaymentTransactionContent {
                    order_id: order_key.clone(),
                    gateway: notification.gateway,
                    account_number: notification.account_number,
                    amount: notification.transfer_amount,
                    content: notification.content,
                    transaction_date: notification.transaction_date,
                    recorded_at: now,
                },
                now,
            )
            .await?;

        // Payment arrived before the timeout: defuse the expiry job
        self.scheduler.cancel(&order_key).await;

        tracing::info!(
            order_id = %order_key,
            external_id = %notification.id,
            "online payment confirmed"
        );
        Ok(WebhookOutcome::Confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_mem_db;
    use crate::db::repository::TransactionRepository;
    use crate::orders::testutil::{
        RecordingScheduler, seed_awaiting_order, seed_variant,
    };
    use shared::order::{OrderStatus, PaymentMethod};

    const NOW: i64 = 1_700_000_000_000;

    fn notification(id: &str, code: &str, amount: i64) -> PaymentNotification {
        PaymentNotification {
            id: id.to_string(),
            code: code.to_string(),
            transfer_type: TRANSFER_TYPE_IN.to_string(),
            transfer_amount: amount,
            gateway: "TestBank".to_string(),
            account_number: "0001".to_string(),
            content: format!("payment for {code}"),
            transaction_date: "2026-08-06 10:00:00".to_string(),
        }
    }

    fn service(db: &Surreal<Db>) -> (PaymentConfirmationService, Arc<RecordingScheduler>) {
        let scheduler = Arc::new(RecordingScheduler::default());
        (
            PaymentConfirmationService::new(db.clone(), scheduler.clone()),
            scheduler,
        )
    }

    // Seeded order "o1" gets payment code "ORD-o1" and total 1000
    async fn seed(db: &Surreal<Db>) {
        seed_variant(db, "v1", "p1", 1000, 4).await;
        seed_awaiting_order(db, "o1", "v1", 1).await;
    }

    #[test]
    fn test_notification_wire_shape() {
        let json = serde_json::json!({
            "id": "TXN123",
            "code": "ORD-ABC",
            "transferType": "in",
            "transferAmount": 2700,
            "gateway": "TestBank",
            "accountNumber": "0001",
            "content": "payment",
            "transactionDate": "2026-08-06 10:00:00",
        });
        let parsed: PaymentNotification = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.transfer_type, "in");
        assert_eq!(parsed.transfer_amount, 2700);
    }

    #[tokio::test]
    async fn test_confirmation_flips_status_and_cancels_job() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, scheduler) = service(&db);

        let outcome = svc
            .handle(notification("TXN1", "ORD-o1", 1000), NOW)
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Confirmed);

        let order = OrderRepository::new(db.clone())
            .find_by_id("o1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.payment_status, PaymentStatus::OnlinePaymentPaid);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_method, PaymentMethod::OnlinePayment);
        assert_eq!(scheduler.cancelled_ids(), vec!["o1".to_string()]);

        let txn = TransactionRepository::new(db)
            .find_by_external_id("TXN1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(txn.amount, 1000);
    }

    #[tokio::test]
    async fn test_overpayment_accepted() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        let outcome = svc
            .handle(notification("TXN1", "ORD-o1", 1500), NOW)
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Confirmed);
    }

    #[tokio::test]
    async fn test_partial_payment_rejected() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, scheduler) = service(&db);

        let err = svc
            .handle(notification("TXN1", "ORD-o1", 999), NOW)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentAmountMismatch);

        // Nothing recorded, job still armed
        let order = OrderRepository::new(db.clone())
            .find_by_id("o1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            order.payment_status,
            PaymentStatus::OnlinePaymentAwaiting
        );
        assert!(scheduler.cancelled_ids().is_empty());
        assert!(
            TransactionRepository::new(db)
                .find_by_external_id("TXN1")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_external_id_is_specific_error() {
        let db = init_mem_db().await.unwrap();
        seed_variant(&db, "v1", "p1", 1000, 4).await;
        seed_awaiting_order(&db, "o1", "v1", 1).await;
        seed_awaiting_order(&db, "o2", "v1", 1).await;
        let (svc, _) = service(&db);

        svc.handle(notification("TXN1", "ORD-o1", 1000), NOW)
            .await
            .unwrap();

        // Same external id replayed against another order
        let err = svc
            .handle(notification("TXN1", "ORD-o2", 1000), NOW)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TransactionAlreadyRecorded);

        // Exactly one row exists for TXN1, and o2 was not flipped
        let order2 = OrderRepository::new(db)
            .find_by_id("o2")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            order2.payment_status,
            PaymentStatus::OnlinePaymentAwaiting
        );
    }

    #[tokio::test]
    async fn test_retried_webhook_rejected_not_double_credited() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        svc.handle(notification("TXN1", "ORD-o1", 1000), NOW)
            .await
            .unwrap();
        let err = svc
            .handle(notification("TXN1", "ORD-o1", 1000), NOW)
            .await
            .unwrap_err();

        // The second call fails on the status check; still a conflict, and
        // distinguishable from a generic failure
        assert!(matches!(
            err.code,
            ErrorCode::PaymentNotAwaiting | ErrorCode::TransactionAlreadyRecorded
        ));
    }

    #[tokio::test]
    async fn test_cod_order_cannot_be_confirmed() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        db.query("UPDATE type::thing('order', 'o1') SET payment_status = 'COD', payment_method = 'COD';")
            .await
            .unwrap()
            .check()
            .unwrap();
        let (svc, _) = service(&db);

        let err = svc
            .handle(notification("TXN1", "ORD-o1", 1000), NOW)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentNotAwaiting);
    }

    #[tokio::test]
    async fn test_unknown_code_not_found() {
        let db = init_mem_db().await.unwrap();
        let (svc, _) = service(&db);

        let err = svc
            .handle(notification("TXN1", "ORD-ghost", 1000), NOW)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn test_outbound_transfer_ignored() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        let mut n = notification("TXN1", "ORD-o1", 1000);
        n.transfer_type = "out".to_string();
        assert_eq!(svc.handle(n, NOW).await.unwrap(), WebhookOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_foreign_prefix_ignored() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        // Token-package purchase, not an order
        let n = notification("TXN1", "TKN-abc", 1000);
        assert_eq!(svc.handle(n, NOW).await.unwrap(), WebhookOutcome::Ignored);

        let order = OrderRepository::new(db)
            .find_by_id("o1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            order.payment_status,
            PaymentStatus::OnlinePaymentAwaiting
        );
    }
}

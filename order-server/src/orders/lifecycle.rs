//! Order lifecycle service
//!
//! Staff and customer transitions over an existing order. Effects are
//! planned purely ([`TransitionEffects`]), then applied in one guarded
//! transaction: the script re-reads the order and aborts if its status
//! moved since the plan was made.

use crate::db::models::Order;
use crate::db::repository::order::TransitionWrite;
use crate::db::repository::OrderRepository;
use crate::orders::expiry::RestorationScheduler;
use crate::orders::transitions::{
    can_transition, can_transition_payment, TransitionError,
};
use shared::error::{AppError, ErrorCode};
use shared::order::{OrderStatus, PaymentStatus};
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Planned outcome of a transition: the status write plus its compensation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEffects {
    pub new_status: OrderStatus,
    /// `PAID → REFUNDING` flip when a paid order leaves the pipeline
    pub new_payment_status: Option<PaymentStatus>,
    /// Credit every line's quantity back to its variant
    pub restore_stock: bool,
}

/// Plan a staff-driven transition. Pure.
///
/// Compensation fires only on entry to `CANCELLED`/`REJECTED` from a status
/// that still holds stock; COD and awaiting orders get no payment flip.
pub fn plan_staff_transition(
    status: OrderStatus,
    payment_status: PaymentStatus,
    to: OrderStatus,
) -> Result<TransitionEffects, TransitionError> {
    can_transition(status, to)?;

    let compensate =
        matches!(to, OrderStatus::Cancelled | OrderStatus::Rejected) && status.holds_stock();
    let new_payment_status = (compensate && payment_status == PaymentStatus::OnlinePaymentPaid)
        .then_some(PaymentStatus::Refunding);

    Ok(TransitionEffects {
        new_status: to,
        new_payment_status,
        restore_stock: compensate,
    })
}

/// Plan a customer cancellation. Pure.
///
/// Legal only while the order is `PENDING` and nothing has been paid
/// (awaiting online payment, or COD).
pub fn plan_customer_cancel(
    status: OrderStatus,
    payment_status: PaymentStatus,
) -> Result<TransitionEffects, AppError> {
    if status != OrderStatus::Pending
        || !matches!(
            payment_status,
            PaymentStatus::OnlinePaymentAwaiting | PaymentStatus::Cod
        )
    {
        return Err(AppError::new(ErrorCode::OrderNotCancellable)
            .with_detail("status", format!("{status:?}"))
            .with_detail("payment_status", format!("{payment_status:?}")));
    }
    Ok(TransitionEffects {
        new_status: OrderStatus::Cancelled,
        new_payment_status: None,
        restore_stock: true,
    })
}

/// Map a table rejection to the wire error, carrying from/to context.
fn transition_app_error(err: TransitionError, from: OrderStatus, to: OrderStatus) -> AppError {
    let code = match err {
        TransitionError::Closed { .. } => ErrorCode::OrderAlreadyClosed,
        _ => ErrorCode::InvalidStatusTransition,
    };
    AppError::with_message(code, err.to_string())
        .with_detail("from", format!("{from:?}"))
        .with_detail("to", format!("{to:?}"))
}

/// Lifecycle service over the order repository
#[derive(Clone)]
pub struct OrderLifecycleService {
    repo: OrderRepository,
    scheduler: Arc<dyn RestorationScheduler>,
}

impl OrderLifecycleService {
    pub fn new(db: Surreal<Db>, scheduler: Arc<dyn RestorationScheduler>) -> Self {
        Self {
            repo: OrderRepository::new(db),
            scheduler,
        }
    }

    async fn load(&self, order_id: &str) -> Result<Order, AppError> {
        self.repo
            .find_by_id(order_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
            })
    }

    /// Staff-driven status change.
    pub async fn staff_transition(
        &self,
        order_id: &str,
        to: OrderStatus,
        now: i64,
    ) -> Result<Order, AppError> {
        let order = self.load(order_id).await?;
        let effects = plan_staff_transition(order.status, order.payment_status, to)
            .map_err(|e| transition_app_error(e, order.status, to))?;

        self.apply(order_id, order.status, effects, None, None, now)
            .await?;

        tracing::info!(order_id, from = ?order.status, ?to, "order status changed");
        self.load(order_id).await
    }

    /// Customer cancellation: `PENDING` + unpaid only, same compensation as
    /// a staff cancellation.
    pub async fn customer_cancel(&self, order_id: &str, now: i64) -> Result<Order, AppError> {
        let order = self.load(order_id).await?;
        let effects = plan_customer_cancel(order.status, order.payment_status)?;

        self.apply(order_id, order.status, effects, None, None, now)
            .await?;

        tracing::info!(order_id, "order cancelled by customer");
        self.load(order_id).await
    }

    /// Customer receipt confirmation: `DELIVERED` only; optionally attaches
    /// feedback text and a 1-5 rating.
    pub async fn confirm_received(
        &self,
        order_id: &str,
        feedback: Option<String>,
        rating: Option<u8>,
        now: i64,
    ) -> Result<Order, AppError> {
        let order = self.load(order_id).await?;
        if order.status != OrderStatus::Delivered {
            return Err(AppError::new(ErrorCode::OrderNotDelivered)
                .with_detail("status", format!("{:?}", order.status)));
        }

        let effects = TransitionEffects {
            new_status: OrderStatus::ConfirmReceived,
            new_payment_status: None,
            restore_stock: false,
        };
        self.apply(order_id, order.status, effects, feedback, rating, now)
            .await?;

        tracing::info!(order_id, "receipt confirmed");
        self.load(order_id).await
    }

    /// Staff-driven payment status change (e.g. `REFUNDING → REFUNDED`).
    /// Validated against the payment transition table.
    pub async fn staff_payment_transition(
        &self,
        order_id: &str,
        to: PaymentStatus,
        now: i64,
    ) -> Result<Order, AppError> {
        let order = self.load(order_id).await?;
        can_transition_payment(order.payment_status, to).map_err(|e| {
            AppError::with_message(ErrorCode::InvalidPaymentTransition, e.to_string())
                .with_detail("from", format!("{:?}", order.payment_status))
                .with_detail("to", format!("{to:?}"))
        })?;

        self.repo
            .update_payment_status(order_id, order.payment_status, to, now)
            .await?;

        // A manual AWAITING → PAID confirmation also defuses the expiry job
        if to == PaymentStatus::OnlinePaymentPaid {
            self.scheduler.cancel(order_id).await;
        }

        tracing::info!(order_id, from = ?order.payment_status, ?to, "payment status changed");
        self.load(order_id).await
    }

    async fn apply(
        &self,
        order_id: &str,
        expected_status: OrderStatus,
        effects: TransitionEffects,
        feedback: Option<String>,
        rating: Option<u8>,
        now: i64,
    ) -> Result<(), AppError> {
        self.repo
            .apply_transition(TransitionWrite {
                order_id: order_id.to_string(),
                expected_status,
                new_status: effects.new_status,
                new_payment_status: effects.new_payment_status,
                feedback,
                rating,
                restore_stock: effects.restore_stock,
                now,
            })
            .await
            .map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_mem_db;
    use crate::orders::testutil::{
        RecordingScheduler, get_variant, seed_awaiting_order, seed_variant,
    };

    fn service(db: &Surreal<Db>) -> (OrderLifecycleService, Arc<RecordingScheduler>) {
        let scheduler = Arc::new(RecordingScheduler::default());
        (
            OrderLifecycleService::new(db.clone(), scheduler.clone()),
            scheduler,
        )
    }

    async fn seed(db: &Surreal<Db>) {
        seed_variant(db, "v1", "p1", 1000, 2).await; // post-debit stock
        seed_awaiting_order(db, "o1", "v1", 3).await;
    }

    // ==================== Pure planning ====================

    #[test]
    fn test_plan_cancel_from_pending_restores_stock() {
        let effects = plan_staff_transition(
            OrderStatus::Pending,
            PaymentStatus::Cod,
            OrderStatus::Cancelled,
        )
        .unwrap();
        assert!(effects.restore_stock);
        assert_eq!(effects.new_payment_status, None, "COD needs no refund flip");
    }

    #[test]
    fn test_plan_reject_paid_order_flips_to_refunding() {
        let effects = plan_staff_transition(
            OrderStatus::Processing,
            PaymentStatus::OnlinePaymentPaid,
            OrderStatus::Rejected,
        )
        .unwrap();
        assert!(effects.restore_stock);
        assert_eq!(effects.new_payment_status, Some(PaymentStatus::Refunding));
    }

    #[test]
    fn test_plan_awaiting_order_gets_no_refund_flip() {
        let effects = plan_staff_transition(
            OrderStatus::Pending,
            PaymentStatus::OnlinePaymentAwaiting,
            OrderStatus::Cancelled,
        )
        .unwrap();
        assert!(effects.restore_stock);
        assert_eq!(effects.new_payment_status, None);
    }

    #[test]
    fn test_plan_forward_move_has_no_compensation() {
        let effects = plan_staff_transition(
            OrderStatus::Pending,
            PaymentStatus::Cod,
            OrderStatus::Processing,
        )
        .unwrap();
        assert!(!effects.restore_stock);
        assert_eq!(effects.new_payment_status, None);
    }

    #[test]
    fn test_plan_customer_cancel_rules() {
        assert!(
            plan_customer_cancel(OrderStatus::Pending, PaymentStatus::OnlinePaymentAwaiting)
                .is_ok()
        );
        assert!(plan_customer_cancel(OrderStatus::Pending, PaymentStatus::Cod).is_ok());
        // Paid or post-pending orders are out of the customer's hands
        assert!(
            plan_customer_cancel(OrderStatus::Pending, PaymentStatus::OnlinePaymentPaid).is_err()
        );
        assert!(plan_customer_cancel(OrderStatus::Processing, PaymentStatus::Cod).is_err());
        assert!(plan_customer_cancel(OrderStatus::Shipped, PaymentStatus::Cod).is_err());
    }

    // ==================== Service paths ====================

    #[tokio::test]
    async fn test_forward_transition() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        let order = svc
            .staff_transition("o1", OrderStatus::Processing, 1)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        // No compensation on a forward move
        assert_eq!(get_variant(&db, "v1").await.stock, 2);
    }

    #[tokio::test]
    async fn test_cancel_restores_stock_exactly_once() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        let order = svc
            .staff_transition("o1", OrderStatus::Cancelled, 1)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(get_variant(&db, "v1").await.stock, 5);

        // Second cancellation attempt fails and must not credit again
        let err = svc
            .staff_transition("o1", OrderStatus::Rejected, 2)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
        assert_eq!(get_variant(&db, "v1").await.stock, 5);
    }

    #[tokio::test]
    async fn test_cod_cancel_keeps_cod_payment_status() {
        let db = init_mem_db().await.unwrap();
        seed_variant(&db, "v1", "p1", 1000, 2).await;
        seed_awaiting_order(&db, "o1", "v1", 3).await;
        db.query(
            "UPDATE type::thing('order', 'o1') SET payment_status = 'COD', payment_method = 'COD';",
        )
        .await
        .unwrap()
        .check()
        .unwrap();
        let (svc, _) = service(&db);

        let order = svc
            .staff_transition("o1", OrderStatus::Cancelled, 1)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        // No refund flip for cash on delivery
        assert_eq!(order.payment_status, PaymentStatus::Cod);
        assert_eq!(get_variant(&db, "v1").await.stock, 5);
    }

    #[tokio::test]
    async fn test_reject_paid_order_flips_refunding() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        svc.staff_payment_transition("o1", PaymentStatus::OnlinePaymentPaid, 1)
            .await
            .unwrap();
        let order = svc
            .staff_transition("o1", OrderStatus::Rejected, 2)
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Rejected);
        assert_eq!(order.payment_status, PaymentStatus::Refunding);
        assert_eq!(get_variant(&db, "v1").await.stock, 5);
    }

    #[tokio::test]
    async fn test_shipped_cancel_rejected_with_conflict() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        svc.staff_transition("o1", OrderStatus::Shipped, 1)
            .await
            .unwrap();
        let err = svc
            .staff_transition("o1", OrderStatus::Cancelled, 2)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);

        // REJECTED remains the legal escape, and still restores stock
        let order = svc
            .staff_transition("o1", OrderStatus::Rejected, 3)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Rejected);
        assert_eq!(get_variant(&db, "v1").await.stock, 5);
    }

    #[tokio::test]
    async fn test_delivered_is_closed_to_staff() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        svc.staff_transition("o1", OrderStatus::Delivered, 1)
            .await
            .unwrap();
        let err = svc
            .staff_transition("o1", OrderStatus::Cancelled, 2)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderAlreadyClosed);
    }

    #[tokio::test]
    async fn test_customer_cancel_from_pending() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        let order = svc.customer_cancel("o1", 1).await.unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.payment_status, PaymentStatus::OnlinePaymentAwaiting);
        assert_eq!(get_variant(&db, "v1").await.stock, 5);
    }

    #[tokio::test]
    async fn test_customer_cancel_blocked_after_processing() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        svc.staff_transition("o1", OrderStatus::Processing, 1)
            .await
            .unwrap();
        let err = svc.customer_cancel("o1", 2).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotCancellable);
    }

    #[tokio::test]
    async fn test_confirm_received_attaches_feedback() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        svc.staff_transition("o1", OrderStatus::Delivered, 1)
            .await
            .unwrap();
        let order = svc
            .confirm_received("o1", Some("great".to_string()), Some(5), 2)
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::ConfirmReceived);
        assert_eq!(order.feedback.as_deref(), Some("great"));
        assert_eq!(order.rating, Some(5));
    }

    #[tokio::test]
    async fn test_confirm_received_requires_delivered() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        let err = svc.confirm_received("o1", None, None, 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotDelivered);
    }

    #[tokio::test]
    async fn test_manual_paid_cancels_expiry_job() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, scheduler) = service(&db);

        svc.staff_payment_transition("o1", PaymentStatus::OnlinePaymentPaid, 1)
            .await
            .unwrap();
        assert_eq!(scheduler.cancelled_ids(), vec!["o1".to_string()]);
    }

    #[tokio::test]
    async fn test_refunding_to_refunded() {
        let db = init_mem_db().await.unwrap();
        seed(&db).await;
        let (svc, _) = service(&db);

        svc.staff_payment_transition("o1", PaymentStatus::OnlinePaymentPaid, 1)
            .await
            .unwrap();
        svc.staff_transition("o1", OrderStatus::Cancelled, 2)
            .await
            .unwrap();
        let order = svc
            .staff_payment_transition("o1", PaymentStatus::Refunded, 3)
            .await
            .unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Refunded);

        // REFUNDED is a sink
        let err = svc
            .staff_payment_transition("o1", PaymentStatus::OnlinePaymentPaid, 4)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPaymentTransition);
    }

    #[tokio::test]
    async fn test_missing_order() {
        let db = init_mem_db().await.unwrap();
        let (svc, _) = service(&db);
        let err = svc
            .staff_transition("ghost", OrderStatus::Processing, 1)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }
}

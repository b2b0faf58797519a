//! Order and payment status transition rules
//!
//! Both machines are pure data: a constant forbidden-pair table consumed by
//! a single `can_transition` function, testable in isolation from
//! persistence. The rules layer in a fixed order:
//!
//! 1. `DELIVERED`/`CONFIRM_RECEIVED` accept no staff-driven transition.
//! 2. The forbidden-pair table: the closed statuses can never be left.
//! 3. A shipped order cannot be cancelled (must be rejected instead).
//! 4. Rank rule: a transition may never decrease the pipeline rank unless
//!    the target is `CANCELLED` or `REJECTED`.

use shared::order::{OrderStatus, PaymentStatus};
use thiserror::Error;

/// Staff transition rejection reasons
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("order in status {from:?} can no longer be modified")]
    Closed { from: OrderStatus },

    #[error("transition {from:?} -> {to:?} is forbidden")]
    Forbidden { from: OrderStatus, to: OrderStatus },

    #[error("a shipped order must be rejected, not cancelled")]
    ShippedCannotCancel,

    #[error("transition {from:?} -> {to:?} would move the order backwards")]
    Backward { from: OrderStatus, to: OrderStatus },
}

/// Payment transition rejection reasons
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentTransitionError {
    #[error("REFUNDED is a terminal payment status")]
    RefundedIsSink,

    #[error("payment transition {from:?} -> {to:?} is forbidden")]
    Forbidden {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

use OrderStatus::*;

/// Explicitly forbidden (from, to) pairs: the closed statuses
/// (`CANCELLED`/`REJECTED`/`CONFIRM_RECEIVED`/`EXPIRED`) can never be left.
pub const FORBIDDEN_TRANSITIONS: &[(OrderStatus, OrderStatus)] = &[
    (Cancelled, Pending),
    (Cancelled, Processing),
    (Cancelled, Shipped),
    (Cancelled, Delivered),
    (Cancelled, ConfirmReceived),
    (Cancelled, Rejected),
    (Cancelled, Expired),
    (Rejected, Pending),
    (Rejected, Processing),
    (Rejected, Shipped),
    (Rejected, Delivered),
    (Rejected, ConfirmReceived),
    (Rejected, Cancelled),
    (Rejected, Expired),
    (Expired, Pending),
    (Expired, Processing),
    (Expired, Shipped),
    (Expired, Delivered),
    (Expired, ConfirmReceived),
    (Expired, Cancelled),
    (Expired, Rejected),
    (ConfirmReceived, Pending),
    (ConfirmReceived, Processing),
    (ConfirmReceived, Shipped),
    (ConfirmReceived, Delivered),
    (ConfirmReceived, Cancelled),
    (ConfirmReceived, Rejected),
    (ConfirmReceived, Expired),
];

/// Validate a staff-driven order status transition.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> Result<(), TransitionError> {
    // Rule 1: delivered orders are out of staff hands
    if matches!(from, Delivered | ConfirmReceived) {
        return Err(TransitionError::Closed { from });
    }

    // Rule 2: forbidden-pair table
    if FORBIDDEN_TRANSITIONS.contains(&(from, to)) {
        return Err(TransitionError::Forbidden { from, to });
    }

    // Rule 3: shipped orders use REJECTED, never CANCELLED
    if from == Shipped && to == Cancelled {
        return Err(TransitionError::ShippedCannotCancel);
    }

    // CANCELLED / REJECTED are always-reachable forward escapes
    if matches!(to, Cancelled | Rejected) && from != to {
        return Ok(());
    }

    // Rule 4: never decrease the pipeline rank; unranked targets are not
    // staff-reachable (EXPIRED is set only by the expiry callback)
    match (from.pipeline_rank(), to.pipeline_rank()) {
        (Some(from_rank), Some(to_rank)) if to_rank > from_rank => Ok(()),
        (Some(_), Some(_)) => Err(TransitionError::Backward { from, to }),
        _ => Err(TransitionError::Forbidden { from, to }),
    }
}

/// Explicitly forbidden payment (from, to) pairs. `REFUNDED` rows are
/// subsumed by the absolute sink rule but stay in the table for
/// completeness.
pub const FORBIDDEN_PAYMENT_TRANSITIONS: &[(PaymentStatus, PaymentStatus)] = &[
    (
        PaymentStatus::OnlinePaymentPaid,
        PaymentStatus::OnlinePaymentAwaiting,
    ),
    (
        PaymentStatus::Refunded,
        PaymentStatus::OnlinePaymentAwaiting,
    ),
    (PaymentStatus::Refunded, PaymentStatus::OnlinePaymentPaid),
    (PaymentStatus::Refunded, PaymentStatus::Cod),
    (PaymentStatus::Cod, PaymentStatus::OnlinePaymentAwaiting),
    (PaymentStatus::Cod, PaymentStatus::OnlinePaymentPaid),
];

/// Validate a payment status transition.
pub fn can_transition_payment(
    from: PaymentStatus,
    to: PaymentStatus,
) -> Result<(), PaymentTransitionError> {
    // Absolute rule: REFUNDED is a sink
    if from == PaymentStatus::Refunded {
        return Err(PaymentTransitionError::RefundedIsSink);
    }
    if from == to {
        return Err(PaymentTransitionError::Forbidden { from, to });
    }
    if FORBIDDEN_PAYMENT_TRANSITIONS.contains(&(from, to)) {
        return Err(PaymentTransitionError::Forbidden { from, to });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Closed-form expected staff transition set, derived independently of
    /// the table implementation.
    fn expected_allowed(from: OrderStatus, to: OrderStatus) -> bool {
        match from {
            Pending => matches!(
                to,
                Processing | Shipped | Delivered | ConfirmReceived | Cancelled | Rejected
            ),
            Processing => matches!(
                to,
                Shipped | Delivered | ConfirmReceived | Cancelled | Rejected
            ),
            Shipped => matches!(to, Delivered | ConfirmReceived | Rejected),
            Delivered | ConfirmReceived | Cancelled | Rejected | Expired => false,
        }
    }

    #[test]
    fn test_exhaustive_transition_table() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let result = can_transition(from, to);
                assert_eq!(
                    result.is_ok(),
                    expected_allowed(from, to),
                    "unexpected verdict for {from:?} -> {to:?}: {result:?}"
                );
            }
        }
    }

    #[test]
    fn test_delivered_is_out_of_staff_hands() {
        for to in OrderStatus::ALL {
            assert_eq!(
                can_transition(Delivered, to),
                Err(TransitionError::Closed { from: Delivered })
            );
        }
    }

    #[test]
    fn test_shipped_cannot_cancel_uses_specific_error() {
        assert_eq!(
            can_transition(Shipped, Cancelled),
            Err(TransitionError::ShippedCannotCancel)
        );
        // Rejection remains open
        assert!(can_transition(Shipped, Rejected).is_ok());
    }

    #[test]
    fn test_backward_moves_rejected() {
        assert_eq!(
            can_transition(Shipped, Processing),
            Err(TransitionError::Backward {
                from: Shipped,
                to: Processing
            })
        );
        assert_eq!(
            can_transition(Processing, Pending),
            Err(TransitionError::Backward {
                from: Processing,
                to: Pending
            })
        );
    }

    #[test]
    fn test_same_state_rejected() {
        for status in OrderStatus::ALL {
            assert!(can_transition(status, status).is_err());
        }
    }

    #[test]
    fn test_expired_not_staff_reachable() {
        for from in [Pending, Processing, Shipped] {
            assert_eq!(
                can_transition(from, Expired),
                Err(TransitionError::Forbidden { from, to: Expired })
            );
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_exit() {
        for from in [Cancelled, Rejected, Expired, ConfirmReceived] {
            for to in OrderStatus::ALL {
                assert!(can_transition(from, to).is_err(), "{from:?} -> {to:?}");
            }
        }
    }

    // ==================== Payment machine ====================

    /// Closed-form expected payment transition set.
    fn expected_payment_allowed(from: PaymentStatus, to: PaymentStatus) -> bool {
        use PaymentStatus::*;
        if from == Refunded || from == to {
            return false;
        }
        !matches!(
            (from, to),
            (OnlinePaymentPaid, OnlinePaymentAwaiting)
                | (Cod, OnlinePaymentAwaiting)
                | (Cod, OnlinePaymentPaid)
        )
    }

    #[test]
    fn test_exhaustive_payment_table() {
        for from in PaymentStatus::ALL {
            for to in PaymentStatus::ALL {
                let result = can_transition_payment(from, to);
                assert_eq!(
                    result.is_ok(),
                    expected_payment_allowed(from, to),
                    "unexpected verdict for {from:?} -> {to:?}: {result:?}"
                );
            }
        }
    }

    #[test]
    fn test_refunded_is_sink() {
        for to in PaymentStatus::ALL {
            assert_eq!(
                can_transition_payment(PaymentStatus::Refunded, to),
                Err(PaymentTransitionError::RefundedIsSink)
            );
        }
    }

    #[test]
    fn test_awaiting_to_paid_allowed() {
        assert!(
            can_transition_payment(
                PaymentStatus::OnlinePaymentAwaiting,
                PaymentStatus::OnlinePaymentPaid
            )
            .is_ok()
        );
    }

    #[test]
    fn test_paid_cannot_revert_to_awaiting() {
        assert!(
            can_transition_payment(
                PaymentStatus::OnlinePaymentPaid,
                PaymentStatus::OnlinePaymentAwaiting
            )
            .is_err()
        );
    }

    #[test]
    fn test_refund_pipeline_allowed() {
        assert!(
            can_transition_payment(PaymentStatus::OnlinePaymentPaid, PaymentStatus::Refunding)
                .is_ok()
        );
        assert!(
            can_transition_payment(PaymentStatus::Refunding, PaymentStatus::Refunded).is_ok()
        );
    }
}

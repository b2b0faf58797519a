//! Order and payment status enums
//!
//! Both status fields are closed enums with an explicit wire format, so
//! illegal states are unrepresentable. Transition rules live server-side in
//! `order-server::orders::transitions`.

use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order placed, not yet processed
    #[default]
    Pending,
    /// Staff accepted the order and is preparing it
    Processing,
    /// Handed to the carrier
    Shipped,
    /// Carrier reported delivery
    Delivered,
    /// Customer confirmed receipt (terminal)
    ConfirmReceived,
    /// Staff rejected the order (terminal)
    Rejected,
    /// Cancelled before shipping (terminal)
    Cancelled,
    /// Unpaid online order timed out (terminal)
    Expired,
}

impl OrderStatus {
    /// All status values, in pipeline order followed by the escape states
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::ConfirmReceived,
        OrderStatus::Rejected,
        OrderStatus::Cancelled,
        OrderStatus::Expired,
    ];

    /// Terminal statuses have no outgoing transitions
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::ConfirmReceived
                | OrderStatus::Rejected
                | OrderStatus::Cancelled
                | OrderStatus::Expired
        )
    }

    /// Position on the happy-path pipeline; escape states carry no rank.
    ///
    /// `PENDING`/`REJECTED`=1, `PROCESSING`=2, `SHIPPED`=3, `DELIVERED`=4,
    /// `CONFIRM_RECEIVED`=5.
    pub const fn pipeline_rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending | OrderStatus::Rejected => Some(1),
            OrderStatus::Processing => Some(2),
            OrderStatus::Shipped => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::ConfirmReceived => Some(5),
            OrderStatus::Cancelled | OrderStatus::Expired => None,
        }
    }

    /// Active statuses hold stock that must be restored on exit
    pub const fn holds_stock(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Processing | OrderStatus::Shipped
        )
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Online payment requested, webhook not yet received
    OnlinePaymentAwaiting,
    /// Online payment confirmed by the gateway
    OnlinePaymentPaid,
    /// Cash on delivery, settled outside the gateway
    Cod,
    /// Refund initiated after a paid order was cancelled/rejected
    Refunding,
    /// Refund settled (sink: no transition out, ever)
    Refunded,
}

impl PaymentStatus {
    /// All payment status values
    pub const ALL: [PaymentStatus; 5] = [
        PaymentStatus::OnlinePaymentAwaiting,
        PaymentStatus::OnlinePaymentPaid,
        PaymentStatus::Cod,
        PaymentStatus::Refunding,
        PaymentStatus::Refunded,
    ];
}

/// Payment method, fixed at checkout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash on delivery
    Cod,
    /// Online payment via the gateway
    OnlinePayment,
}

impl PaymentMethod {
    /// Initial payment status for an order placed with this method
    pub const fn initial_payment_status(&self) -> PaymentStatus {
        match self {
            PaymentMethod::Cod => PaymentStatus::Cod,
            PaymentMethod::OnlinePayment => PaymentStatus::OnlinePaymentAwaiting,
        }
    }
}

/// Voucher discount type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// Percentage of the unit price (0-100)
    Percent,
    /// Fixed amount in minor currency units
    FixedAmount,
}

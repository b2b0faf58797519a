//! Order lifecycle module
//!
//! - **transitions**: both state machines as pure table data
//! - **checkout**: read phase → pure pricing → one atomic write
//! - **lifecycle**: staff/customer transitions with compensation effects
//! - **expiry**: stock-restoration scheduler for unpaid online orders
//!
//! # Data flow
//!
//! ```text
//! Checkout → PricingEngine → CheckoutWrite (one transaction)
//!                 ↓
//!            ExpiryScheduler (online orders only)
//!                 ↓ timeout                    ↑ cancel on AWAITING→PAID
//!            expire_if_awaiting ── stock restored
//! ```

pub mod checkout;
pub mod expiry;
pub mod lifecycle;
pub mod transitions;

#[cfg(test)]
pub mod testutil;

/// Prefix of order payment codes; gateway notifications whose code carries a
/// different prefix belong to sibling handlers, not this module.
pub const PAYMENT_CODE_PREFIX: &str = "ORD-";

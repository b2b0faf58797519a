//! Order Pricing Engine
//!
//! Turns requested lines into priced order-line snapshots:
//!
//! - **matcher**: voucher eligibility and best-voucher selection
//! - **calculator**: per-unit discount math (`rust_decimal`, explicit rounding)
//! - **engine**: two-phase pricing: aggregate validation over a bulk-loaded
//!   catalog snapshot, then a pure computation with no I/O
//!
//! The engine mutates nothing; it returns stock debits and voucher usage
//! deltas for the transactional write phase to apply.

pub mod calculator;
pub mod engine;
pub mod matcher;

pub use engine::{PricedOrder, PricingInput, PricingViolations, StockShortage, price_order};

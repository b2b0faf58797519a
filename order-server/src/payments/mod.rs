//! Payment confirmation module
//!
//! Inbound gateway notifications: prefix routing, precondition checks, and
//! the idempotent confirmation write.

pub mod webhook;

pub use webhook::{PaymentConfirmationService, PaymentNotification, WebhookOutcome};

//! Database models
//!
//! Row structs for the SurrealDB tables. Ids are [`surrealdb::RecordId`]s;
//! the serde helpers accept both the native format and "table:id" strings.

pub mod design;
pub mod order;
pub mod product;
pub mod serde_helpers;
pub mod transaction;
pub mod voucher;

pub use design::Design;
pub use order::{Order, OrderContent, OrderDetail, OrderItem, OrderItemContent};
pub use product::{Product, ProductVariant, VariantWithProduct};
pub use transaction::{PaymentTransaction, PaymentTransactionContent};
pub use voucher::Voucher;

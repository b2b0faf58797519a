//! Repository Module
//!
//! CRUD and transaction scripts over the SurrealDB tables. Multi-entity
//! writes run as single `BEGIN TRANSACTION … COMMIT TRANSACTION` scripts
//! with `THROW` guards, so an invariant that no longer holds at write time
//! rolls the whole unit of work back.

pub mod catalog;
pub mod order;
pub mod transaction;
pub mod voucher;

pub use catalog::CatalogRepository;
pub use order::OrderRepository;
pub use transaction::TransactionRepository;
pub use voucher::VoucherRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Guard marker thrown when a re-read inside a transaction finds the stock
/// check no longer satisfiable.
pub const GUARD_INSUFFICIENT_STOCK: &str = "GUARD_INSUFFICIENT_STOCK";
/// Guard marker thrown when an order's status changed under us.
pub const GUARD_STATUS_CHANGED: &str = "GUARD_STATUS_CHANGED";
/// Guard marker thrown when the payment is not awaiting confirmation.
pub const GUARD_NOT_AWAITING: &str = "GUARD_NOT_AWAITING";
/// Guard marker thrown when the external payment id was already recorded.
pub const GUARD_DUPLICATE_TRANSACTION: &str = "GUARD_DUPLICATE_TRANSACTION";

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transaction guard tripped: {0}")]
    Guard(&'static str),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // THROW inside a transaction script surfaces as a generic error
        // string; classify guard markers back into typed errors.
        for marker in [
            GUARD_INSUFFICIENT_STOCK,
            GUARD_STATUS_CHANGED,
            GUARD_NOT_AWAITING,
            GUARD_DUPLICATE_TRANSACTION,
        ] {
            if msg.contains(marker) {
                return RepoError::Guard(marker);
            }
        }
        RepoError::Database(msg)
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

impl From<RepoError> for shared::error::AppError {
    fn from(err: RepoError) -> Self {
        use shared::error::{AppError, ErrorCode};
        match err {
            RepoError::NotFound(what) => AppError::not_found(what),
            RepoError::Guard(GUARD_INSUFFICIENT_STOCK) => {
                AppError::new(ErrorCode::InsufficientStock)
            }
            RepoError::Guard(GUARD_NOT_AWAITING) => AppError::new(ErrorCode::PaymentNotAwaiting),
            RepoError::Guard(GUARD_DUPLICATE_TRANSACTION) => {
                AppError::new(ErrorCode::TransactionAlreadyRecorded)
            }
            RepoError::Guard(_) => AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                "order changed concurrently, transition aborted",
            ),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Surface transaction-script errors.
///
/// When a `THROW` cancels a transaction, every other statement reports a
/// generic "transaction cancelled" error; scan them all and prefer the
/// guard marker over that noise.
pub(crate) fn check_script(mut response: surrealdb::Response) -> RepoResult<surrealdb::Response> {
    let mut errors = response.take_errors();
    if errors.is_empty() {
        return Ok(response);
    }

    let mut indices: Vec<usize> = errors.keys().copied().collect();
    indices.sort_unstable();

    let mut fallback: Option<RepoError> = None;
    for idx in indices {
        if let Some(err) = errors.remove(&idx) {
            let converted = RepoError::from(err);
            if matches!(converted, RepoError::Guard(_)) {
                return Err(converted);
            }
            fallback.get_or_insert(converted);
        }
    }
    Err(fallback.unwrap_or_else(|| RepoError::Database("script failed".to_string())))
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Strip a "table:" prefix from an id if present, returning the bare key.
pub fn strip_table_prefix<'a>(table: &str, id: &'a str) -> &'a str {
    id.strip_prefix(table)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(id)
}

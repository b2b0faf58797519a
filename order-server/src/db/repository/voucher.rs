//! Voucher Repository

use super::{BaseRepository, RepoResult};
use crate::db::models::Voucher;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct VoucherRepository {
    base: BaseRepository,
}

impl VoucherRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Bulk-load vouchers by code, preserving nothing about input order;
    /// the pricing engine re-orders them to match the request.
    pub async fn find_by_codes(&self, codes: &[String]) -> RepoResult<Vec<Voucher>> {
        let codes: Vec<String> = codes.to_vec();
        let vouchers: Vec<Voucher> = self
            .base
            .db()
            .query("SELECT * FROM voucher WHERE code IN $codes")
            .bind(("codes", codes))
            .await?
            .take(0)?;
        Ok(vouchers)
    }
}

//! Catalog Repository
//!
//! Read-only access to products, variants and designs for the checkout read
//! phase. Catalog CRUD lives outside this core.

use super::{BaseRepository, RepoResult, strip_table_prefix};
use crate::db::models::VariantWithProduct;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const VARIANT_TABLE: &str = "product_variant";
const DESIGN_TABLE: &str = "design";

#[derive(Clone)]
pub struct CatalogRepository {
    base: BaseRepository,
}

impl CatalogRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Bulk-load variants with their products fetched.
    ///
    /// Unknown ids are simply absent from the result; the pricing engine
    /// reports them. Ids may be bare keys or "product_variant:key".
    pub async fn find_variants_with_product(
        &self,
        ids: &[String],
    ) -> RepoResult<Vec<VariantWithProduct>> {
        let things: Vec<RecordId> = ids
            .iter()
            .map(|id| RecordId::from_table_key(VARIANT_TABLE, strip_table_prefix(VARIANT_TABLE, id)))
            .collect();

        let variants: Vec<VariantWithProduct> = self
            .base
            .db()
            .query("SELECT * FROM product_variant WHERE id IN $ids FETCH product")
            .bind(("ids", things))
            .await?
            .take(0)?;
        Ok(variants)
    }

    /// Return the subset of design ids that exist.
    pub async fn find_existing_designs(&self, ids: &[String]) -> RepoResult<Vec<String>> {
        let things: Vec<RecordId> = ids
            .iter()
            .map(|id| RecordId::from_table_key(DESIGN_TABLE, strip_table_prefix(DESIGN_TABLE, id)))
            .collect();

        let mut result = self
            .base
            .db()
            .query("SELECT VALUE record::id(id) FROM design WHERE id IN $ids")
            .bind(("ids", things))
            .await?;
        let found: Vec<String> = result.take(0)?;
        Ok(found)
    }
}

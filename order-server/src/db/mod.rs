//! Database Module
//!
//! Embedded SurrealDB connection and schema definition.

pub mod models;
pub mod repository;

use shared::error::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "shop";
const DATABASE: &str = "orders";

/// Schema: unique indexes back the correlation and idempotency contracts.
const SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS product_variant SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS voucher SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS design SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS order SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS order_item SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS payment_transaction SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS voucher_code_idx ON TABLE voucher FIELDS code UNIQUE;
    DEFINE INDEX IF NOT EXISTS order_payment_code_idx ON TABLE order FIELDS payment_code UNIQUE;
    DEFINE INDEX IF NOT EXISTS order_item_order_idx ON TABLE order_item FIELDS order;
"#;

/// Open the on-disk database and apply the schema
pub async fn init_db(path: &str) -> Result<Surreal<Db>, AppError> {
    let db = Surreal::new::<RocksDb>(path)
        .await
        .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
    select_and_define(&db).await?;
    tracing::info!("Database opened at {}", path);
    Ok(db)
}

/// Open an in-memory database (tests and local experiments)
pub async fn init_mem_db() -> Result<Surreal<Db>, AppError> {
    let db = Surreal::new::<Mem>(())
        .await
        .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
    select_and_define(&db).await?;
    Ok(db)
}

async fn select_and_define(db: &Surreal<Db>) -> Result<(), AppError> {
    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;
    db.query(SCHEMA)
        .await
        .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;
    Ok(())
}

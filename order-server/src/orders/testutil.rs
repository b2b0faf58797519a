//! Shared fixtures for order service tests

use crate::db::models::{Order, ProductVariant, Voucher};
use crate::orders::PAYMENT_CODE_PREFIX;
use crate::orders::expiry::RestorationScheduler;
use async_trait::async_trait;
use shared::order::DiscountType;
use std::sync::Mutex;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

pub async fn seed_variant(db: &Surreal<Db>, key: &str, product_key: &str, price: i64, stock: i64) {
    db.query(
        "UPSERT type::thing('product', $pk) SET name = $name, image_url = $img, is_deleted = false;\n\
         UPSERT type::thing('product_variant', $vk) SET product = type::thing('product', $pk), \
         sku = $sku, price = $price, stock = $stock, is_deleted = false;",
    )
    .bind(("pk", product_key.to_string()))
    .bind(("name", format!("Product {product_key}")))
    .bind(("img", format!("https://img.example/{product_key}.jpg")))
    .bind(("vk", key.to_string()))
    .bind(("sku", format!("SKU-{key}")))
    .bind(("price", price))
    .bind(("stock", stock))
    .await
    .unwrap()
    .check()
    .unwrap();
}

#[allow(clippy::too_many_arguments)]
pub async fn seed_voucher(
    db: &Surreal<Db>,
    key: &str,
    code: &str,
    discount_type: DiscountType,
    value: i64,
    starts_at: i64,
    ends_at: i64,
    product_keys: &[&str],
) {
    let products: Vec<String> = product_keys.iter().map(|p| p.to_string()).collect();
    db.query(
        "UPSERT type::thing('voucher', $k) SET code = $code, discount_type = $dt, value = $value, \
         starts_at = $starts, ends_at = $ends, used_count = 0, is_active = true, \
         products = $products.map(|$p| type::thing('product', $p));",
    )
    .bind(("k", key.to_string()))
    .bind(("code", code.to_string()))
    .bind(("dt", discount_type))
    .bind(("value", value))
    .bind(("starts", starts_at))
    .bind(("ends", ends_at))
    .bind(("products", products))
    .await
    .unwrap()
    .check()
    .unwrap();
}

pub async fn seed_design(db: &Surreal<Db>, key: &str) {
    db.query("UPSERT type::thing('design', $k) SET name = $name;")
        .bind(("k", key.to_string()))
        .bind(("name", format!("Design {key}")))
        .await
        .unwrap()
        .check()
        .unwrap();
}

/// Seed an order directly in `PENDING` / `ONLINE_PAYMENT_AWAITING` with one
/// item line, without touching stock; the caller sets stock to the
/// post-debit value.
pub async fn seed_awaiting_order(db: &Surreal<Db>, order_key: &str, variant_key: &str, qty: i64) {
    db.query(
        "CREATE type::thing('order', $k) SET payment_code = $code, status = 'PENDING', \
         payment_status = 'ONLINE_PAYMENT_AWAITING', payment_method = 'ONLINE_PAYMENT', \
         recipient_name = 'Test', recipient_phone = '555-0100', recipient_address = '1 Test St', \
         subtotal = 1000, discount = 0, total = 1000, created_at = 0, updated_at = 0;\n\
         CREATE order_item SET `order` = type::thing('order', $k), \
         variant = type::thing('product_variant', $vk), product_name = 'Seeded', sku = 'SKU', \
         image_url = '', unit_price = 1000, quantity = $qty, subtotal = 1000, \
         discount_amount = 0, total_amount = 1000;",
    )
    .bind(("k", order_key.to_string()))
    .bind(("code", format!("{PAYMENT_CODE_PREFIX}{order_key}")))
    .bind(("vk", variant_key.to_string()))
    .bind(("qty", qty))
    .await
    .unwrap()
    .check()
    .unwrap();
}

pub async fn get_variant(db: &Surreal<Db>, key: &str) -> ProductVariant {
    let variant: Option<ProductVariant> = db
        .select(("product_variant", key.to_string()))
        .await
        .unwrap();
    variant.expect("variant seeded")
}

pub async fn get_voucher(db: &Surreal<Db>, key: &str) -> Voucher {
    let voucher: Option<Voucher> = db.select(("voucher", key.to_string())).await.unwrap();
    voucher.expect("voucher seeded")
}

pub async fn get_order(db: &Surreal<Db>, key: &str) -> Order {
    let order: Option<Order> = db.select(("order", key.to_string())).await.unwrap();
    order.expect("order seeded")
}

/// Recording stub for the scheduler seam
#[derive(Default)]
pub struct RecordingScheduler {
    pub scheduled: Mutex<Vec<(String, Duration)>>,
    pub cancelled: Mutex<Vec<String>>,
}

impl RecordingScheduler {
    pub fn scheduled_ids(&self) -> Vec<String> {
        self.scheduled
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn cancelled_ids(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl RestorationScheduler for RecordingScheduler {
    async fn schedule(&self, order_id: String, delay: Duration) {
        self.scheduled.lock().unwrap().push((order_id, delay));
    }

    async fn cancel(&self, order_id: &str) {
        self.cancelled.lock().unwrap().push(order_id.to_string());
    }
}

//! Stock-restoration scheduler
//!
//! Unpaid online orders expire after a configurable delay: the job moves the
//! order to `EXPIRED` and credits its stock back, unless payment or
//! cancellation got there first. Jobs are cancelled on `AWAITING → PAID`.

use crate::db::repository::OrderRepository;
use crate::utils::time::now_millis;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

/// Scheduler seam: the checkout service schedules a job at order creation,
/// the payment path cancels it on confirmation.
#[async_trait]
pub trait RestorationScheduler: Send + Sync {
    async fn schedule(&self, order_id: String, delay: Duration);
    async fn cancel(&self, order_id: &str);
}

/// Tokio-backed scheduler: one sleeper task per pending order, tracked in a
/// job table so confirmation can abort it. All jobs die with the parent
/// shutdown token.
pub struct ExpiryScheduler {
    db: Surreal<Db>,
    jobs: Arc<DashMap<String, CancellationToken>>,
    shutdown: CancellationToken,
}

impl ExpiryScheduler {
    pub fn new(db: Surreal<Db>, shutdown: CancellationToken) -> Self {
        Self {
            db,
            jobs: Arc::new(DashMap::new()),
            shutdown,
        }
    }

    /// Number of live expiry jobs
    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }
}

#[async_trait]
impl RestorationScheduler for ExpiryScheduler {
    async fn schedule(&self, order_id: String, delay: Duration) {
        let token = self.shutdown.child_token();
        self.jobs.insert(order_id.clone(), token.clone());

        let db = self.db.clone();
        let jobs = Arc::clone(&self.jobs);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(%order_id, "expiry job cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    let repo = OrderRepository::new(db);
                    match repo.expire_if_awaiting(&order_id, now_millis()).await {
                        Ok(true) => {
                            tracing::info!(%order_id, "unpaid order expired, stock restored");
                        }
                        Ok(false) => {
                            tracing::debug!(%order_id, "expiry no-op, order already handled");
                        }
                        Err(e) => {
                            tracing::error!(%order_id, error = %e, "expiry job failed");
                        }
                    }
                }
            }
            jobs.remove(&order_id);
        });
    }

    async fn cancel(&self, order_id: &str) {
        if let Some((_, token)) = self.jobs.remove(order_id) {
            token.cancel();
        }
    }
}

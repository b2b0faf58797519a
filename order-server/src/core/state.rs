//! Server state
//!
//! Owns the database handle and the expiry scheduler; services are cheap
//! per-request constructions over these.

use crate::core::Config;
use crate::db;
use crate::orders::checkout::CheckoutService;
use crate::orders::expiry::{ExpiryScheduler, RestorationScheduler};
use crate::orders::lifecycle::OrderLifecycleService;
use crate::payments::PaymentConfirmationService;
use shared::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct ServerState {
    pub db: Surreal<Db>,
    pub config: Config,
    pub scheduler: Arc<ExpiryScheduler>,
}

impl ServerState {
    /// Open the database and wire the scheduler.
    pub async fn initialize(
        config: &Config,
        shutdown: CancellationToken,
    ) -> Result<Self, AppError> {
        let db = db::init_db(&config.db_path).await?;
        let scheduler = Arc::new(ExpiryScheduler::new(db.clone(), shutdown));
        Ok(Self {
            db,
            config: config.clone(),
            scheduler,
        })
    }

    /// In-memory state for tests.
    pub async fn initialize_in_memory(config: &Config) -> Result<Self, AppError> {
        let db = db::init_mem_db().await?;
        let scheduler = Arc::new(ExpiryScheduler::new(db.clone(), CancellationToken::new()));
        Ok(Self {
            db,
            config: config.clone(),
            scheduler,
        })
    }

    fn scheduler_handle(&self) -> Arc<dyn RestorationScheduler> {
        self.scheduler.clone()
    }

    pub fn checkout_service(&self) -> CheckoutService {
        CheckoutService::new(
            self.db.clone(),
            self.scheduler_handle(),
            Duration::from_secs(self.config.payment_expiry_minutes * 60),
        )
    }

    pub fn lifecycle_service(&self) -> OrderLifecycleService {
        OrderLifecycleService::new(self.db.clone(), self.scheduler_handle())
    }

    pub fn payment_service(&self) -> PaymentConfirmationService {
        PaymentConfirmationService::new(self.db.clone(), self.scheduler_handle())
    }
}

//! Server configuration
//!
//! # Environment variables
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | WORK_DIR | /var/lib/order-server | Working directory |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | DB_PATH | <WORK_DIR>/data | SurrealDB storage path |
//! | PAYMENT_EXPIRY_MINUTES | 15 | Unpaid online order timeout |
//! | LOG_LEVEL | info | Log level filter |
//! | LOG_DIR | (stdout) | Optional daily-rolling log directory |
//! | ENVIRONMENT | development | development \| staging \| production |

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for data and logs
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// SurrealDB storage path
    pub db_path: String,
    /// Minutes before an unpaid online order expires
    pub payment_expiry_minutes: u64,
    /// Log level filter
    pub log_level: String,
    /// Optional log directory (stdout when unset)
    pub log_dir: Option<String>,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let work_dir =
            std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/order-server".into());
        let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| format!("{work_dir}/data"));
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            db_path,
            payment_expiry_minutes: std::env::var("PAYMENT_EXPIRY_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(15),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            work_dir,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

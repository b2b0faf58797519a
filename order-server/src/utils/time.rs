//! Time helpers
//!
//! All timestamps are Unix milliseconds (`i64`). Handlers sample `now` once
//! and pass it down; pure computation never reads the clock itself.

use chrono::Utc;

/// Current time as Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Minutes to millis
pub const fn minutes_to_millis(minutes: u64) -> i64 {
    (minutes * 60 * 1000) as i64
}

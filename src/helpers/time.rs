use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Wall-clock UNIX timestamp for a monotonic deadline, for logs and metrics only.
pub fn deadline_unix_ts(deadline: Instant) -> i64 {
    let remaining = deadline.saturating_duration_since(get_instant());
    now_i64() + remaining.as_secs() as i64
}

pub fn deadline_rfc3339(deadline: Instant) -> String {
    DateTime::from_timestamp(deadline_unix_ts(deadline), 0)
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_owned())
}

pub fn secs(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}

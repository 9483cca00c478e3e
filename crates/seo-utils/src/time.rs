//! Timestamp and elapsed-time helpers shared by the crawler and report builder.

use chrono::{DateTime, Utc};

pub fn now_unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Milliseconds between `start` and now, never negative.
pub fn elapsed_ms_since(start: DateTime<Utc>) -> i64 {
    (Utc::now() - start).num_milliseconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_non_negative() {
        let start = Utc::now();
        assert!(elapsed_ms_since(start) >= 0);
    }
}

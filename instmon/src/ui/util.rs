//! Small UI helpers.

use chrono::{Local, TimeZone};

/// Local wall-clock time for an epoch-ms timestamp.
pub fn clock(ts_ms: i64) -> String {
    match Local.timestamp_millis_opt(ts_ms).single() {
        Some(t) => t.format("%H:%M:%S").to_string(),
        None => "--:--:--".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_hh_mm_ss() {
        let s = clock(1_700_000_000_000);
        assert_eq!(s.len(), 8);
        assert_eq!(s.matches(':').count(), 2);
    }
}

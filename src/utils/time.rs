use chrono::{Local, TimeZone};

/// Wall clock in Unix milliseconds.
pub fn now_ms() -> i64 {
    Local::now().timestamp_millis()
}

/// Local `HH:MM:SS` used to label fight snapshots.
pub fn local_time_label(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(time) => time.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

/// `HH:MM:SS` for an elapsed duration.
pub fn format_elapsed(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Compact number for bar labels: 1234 -> "1.2k", 2500000 -> "2.5M".
pub fn format_compact(value: u64) -> String {
    match value {
        v if v >= 1_000_000 => format!("{:.1}M", v as f64 / 1_000_000.0),
        v if v >= 1_000 => format!("{:.1}k", v as f64 / 1_000.0),
        v => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_zero_padded() {
        assert_eq!(format_elapsed(0), "00:00:00");
        assert_eq!(format_elapsed(3_723_000), "01:02:03");
        assert_eq!(format_elapsed(-5), "00:00:00");
    }

    #[test]
    fn compact_numbers() {
        assert_eq!(format_compact(950), "950");
        assert_eq!(format_compact(1_234), "1.2k");
        assert_eq!(format_compact(2_500_000), "2.5M");
    }

    #[test]
    fn label_has_clock_shape() {
        let label = local_time_label(now_ms());
        assert_eq!(label.len(), 8);
        assert_eq!(label.as_bytes()[2], b':');
    }
}

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Clear the meter when the next fight starts after a fight-end line
    pub auto_reset: bool,
    /// Tailing tick period in milliseconds (250-10000)
    pub poll_interval_ms: u64,
    /// Age after which a stuck in-flight read is force-cleared (500-30000)
    pub stale_read_ms: u64,
    /// Consecutive lost-file ticks before tracking stops (1-100)
    pub failure_threshold: u32,
    /// Recently seen lines kept for deduplication (50-10000)
    pub dedup_capacity: usize,
    /// Fight snapshots kept in history (1-20)
    pub history_capacity: usize,
    /// Chat messages kept in the feed (10-2000)
    pub chat_history: usize,
    /// Explicit log file, overriding discovery
    pub log_path: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            auto_reset: true,
            poll_interval_ms: 1000,
            stale_read_ms: 2000,
            failure_threshold: 10,
            dedup_capacity: 500,
            history_capacity: 5,
            chat_history: 200,
            log_path: None,
        }
    }
}

impl AppSettings {
    pub fn set_poll_interval_ms(&mut self, ms: u64) {
        self.poll_interval_ms = ms.clamp(250, 10_000);
    }

    pub fn set_stale_read_ms(&mut self, ms: u64) {
        self.stale_read_ms = ms.clamp(500, 30_000);
    }

    pub fn set_failure_threshold(&mut self, strikes: u32) {
        self.failure_threshold = strikes.clamp(1, 100);
    }

    pub fn set_dedup_capacity(&mut self, lines: usize) {
        self.dedup_capacity = lines.clamp(50, 10_000);
    }

    pub fn set_history_capacity(&mut self, fights: usize) {
        self.history_capacity = fights.clamp(1, 20);
    }

    pub fn set_chat_history(&mut self, messages: usize) {
        self.chat_history = messages.clamp(10, 2000);
    }

    /// Re-applies every clamp, for values read from disk.
    pub fn sanitized(mut self) -> Self {
        self.set_poll_interval_ms(self.poll_interval_ms);
        self.set_stale_read_ms(self.stale_read_ms);
        self.set_failure_threshold(self.failure_threshold);
        self.set_dedup_capacity(self.dedup_capacity);
        self.set_history_capacity(self.history_capacity);
        self.set_chat_history(self.chat_history);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_clamps_out_of_range_values() {
        let settings = AppSettings {
            poll_interval_ms: 1,
            failure_threshold: 0,
            history_capacity: 500,
            ..AppSettings::default()
        }
        .sanitized();
        assert_eq!(settings.poll_interval_ms, 250);
        assert_eq!(settings.failure_threshold, 1);
        assert_eq!(settings.history_capacity, 20);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{ "auto_reset": false }"#).unwrap();
        assert!(!settings.auto_reset);
        assert_eq!(settings.dedup_capacity, 500);
    }
}

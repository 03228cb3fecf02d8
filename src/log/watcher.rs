use std::time::{Duration, Instant};

use crate::error::SourceError;
use crate::log::source::LogSource;
use crate::models::AppSettings;

/// Where the driver is in the file and whether a read is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailCursor {
    pub file_offset: u64,
    pub is_reading: bool,
    pub read_started: Option<Instant>,
    pub consecutive_failures: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing new, or only a partial line so far.
    Idle,
    /// A previous read still holds the in-flight flag.
    Skipped,
    Read { lines: Vec<String> },
    /// The writer holds the file; no strike recorded.
    Busy,
    Failed { strikes: u32 },
    /// Too many consecutive losses; call `reconnect` to resume.
    Stopped,
}

/// Polls a `LogSource` and hands back every complete line appended since the
/// last tick. Partial trailing lines stay in the file until their newline
/// arrives.
pub struct TailDriver<S: LogSource> {
    source: S,
    cursor: TailCursor,
    poll_interval: Duration,
    stale_after: Duration,
    failure_threshold: u32,
    last_poll: Option<Instant>,
    stopped: bool,
}

impl<S: LogSource> TailDriver<S> {
    pub fn new(source: S, settings: &AppSettings) -> Self {
        let mut driver = Self {
            source,
            cursor: TailCursor::default(),
            poll_interval: Duration::ZERO,
            stale_after: Duration::ZERO,
            failure_threshold: 1,
            last_poll: None,
            stopped: false,
        };
        driver.apply_settings(settings);
        driver
    }

    pub fn apply_settings(&mut self, settings: &AppSettings) {
        self.poll_interval = Duration::from_millis(settings.poll_interval_ms);
        self.stale_after = Duration::from_millis(settings.stale_read_ms);
        self.failure_threshold = settings.failure_threshold.max(1);
    }

    /// Starts tailing from the current end of the file so old history is
    /// not replayed.
    pub fn track(&mut self) -> Result<u64, SourceError> {
        let size = self.source.size()?;
        self.cursor = TailCursor {
            file_offset: size,
            ..TailCursor::default()
        };
        self.stopped = false;
        tracing::info!(offset = size, "tailing log from end of file");
        Ok(size)
    }

    pub fn reconnect(&mut self) -> Result<u64, SourceError> {
        tracing::info!("reconnecting to log file");
        self.track()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_poll {
            Some(last) => now.saturating_duration_since(last) >= self.poll_interval,
            None => true,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn cursor(&self) -> &TailCursor {
        &self.cursor
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        self.last_poll = Some(now);
        if self.stopped {
            return TickOutcome::Stopped;
        }

        if self.cursor.is_reading {
            let held = self
                .cursor
                .read_started
                .map(|started| now.saturating_duration_since(started))
                .unwrap_or_default();
            if held <= self.stale_after {
                return TickOutcome::Skipped;
            }
            tracing::warn!(held_ms = held.as_millis() as u64, "read flag held too long, clearing it");
            self.cursor.is_reading = false;
            self.cursor.read_started = None;
        }

        self.cursor.is_reading = true;
        self.cursor.read_started = Some(now);
        let result = self.read_new_lines();
        self.cursor.is_reading = false;
        self.cursor.read_started = None;

        match result {
            Ok(lines) if lines.is_empty() => TickOutcome::Idle,
            Ok(lines) => TickOutcome::Read { lines },
            Err(e) => self.on_error(e),
        }
    }

    fn read_new_lines(&mut self) -> Result<Vec<String>, SourceError> {
        let size = self.source.size()?;
        self.cursor.consecutive_failures = 0;

        if size < self.cursor.file_offset {
            tracing::warn!(size, offset = self.cursor.file_offset, "log was truncated, reading from the start");
            self.cursor.file_offset = 0;
        }
        if size == self.cursor.file_offset {
            return Ok(Vec::new());
        }

        let bytes = self
            .source
            .read_range(self.cursor.file_offset, size - self.cursor.file_offset)?;
        let Some(last_newline) = bytes.iter().rposition(|&b| b == b'\n') else {
            return Ok(Vec::new());
        };

        self.cursor.file_offset += last_newline as u64 + 1;
        let text = String::from_utf8_lossy(&bytes[..last_newline]);
        Ok(text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect())
    }

    fn on_error(&mut self, err: SourceError) -> TickOutcome {
        match err {
            SourceError::Busy(reason) => {
                tracing::warn!(%reason, "log file busy, retrying next tick");
                TickOutcome::Busy
            }
            SourceError::Lost(reason) => {
                self.cursor.consecutive_failures += 1;
                let strikes = self.cursor.consecutive_failures;
                if strikes >= self.failure_threshold {
                    tracing::error!(%reason, strikes, "log file unreachable, stopping tail");
                    self.stopped = true;
                    TickOutcome::Stopped
                } else {
                    tracing::warn!(%reason, strikes, "log file unreachable");
                    TickOutcome::Failed { strikes }
                }
            }
            SourceError::Io(e) => {
                tracing::error!(error = %e, "log read failed");
                TickOutcome::Failed {
                    strikes: self.cursor.consecutive_failures,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    /// Scripted source: each `size` call pops the next queued result, reads come from
    /// an in-memory buffer.
    struct ScriptedSource {
        sizes: VecDeque<Result<u64, SourceError>>,
        data: Vec<u8>,
    }

    impl ScriptedSource {
        fn new(data: &[u8]) -> Self {
            Self { sizes: VecDeque::new(), data: data.to_vec() }
        }

        fn then(mut self, size: Result<u64, SourceError>) -> Self {
            self.sizes.push_back(size);
            self
        }
    }

    impl LogSource for ScriptedSource {
        fn size(&mut self) -> Result<u64, SourceError> {
            self.sizes
                .pop_front()
                .unwrap_or(Ok(self.data.len() as u64))
        }

        fn read_range(&mut self, offset: u64, len: u64) -> Result<Vec<u8>, SourceError> {
            let start = offset as usize;
            let end = (start + len as usize).min(self.data.len());
            Ok(self.data[start..end].to_vec())
        }
    }

    fn settings() -> AppSettings {
        AppSettings::default()
    }

    fn lost() -> Result<u64, SourceError> {
        Err(SourceError::Lost("gone".into()))
    }

    #[test]
    fn yields_complete_lines_and_keeps_partial_tail() {
        let source = ScriptedSource::new(b"one\r\ntwo\nthr");
        let mut driver = TailDriver::new(source, &settings());

        let outcome = driver.tick(Instant::now());
        assert_eq!(outcome, TickOutcome::Read { lines: vec!["one".into(), "two".into()] });
        assert_eq!(driver.cursor().file_offset, 9);

        assert_eq!(driver.tick(Instant::now()), TickOutcome::Idle);
        assert_eq!(driver.cursor().file_offset, 9);
    }

    #[test]
    fn track_skips_existing_content() {
        let source = ScriptedSource::new(b"old line\n");
        let mut driver = TailDriver::new(source, &settings());
        assert_eq!(driver.track().unwrap(), 9);
        assert_eq!(driver.tick(Instant::now()), TickOutcome::Idle);
    }

    #[test]
    fn truncated_log_is_read_from_the_start() {
        let source = ScriptedSource::new(b"first\nsecond\n");
        let mut driver = TailDriver::new(source, &settings());
        driver.tick(Instant::now());
        assert_eq!(driver.cursor().file_offset, 13);

        driver.source.data = b"new\n".to_vec();
        assert_eq!(driver.tick(Instant::now()), TickOutcome::Read { lines: vec!["new".into()] });
        assert_eq!(driver.cursor().file_offset, 4);
    }

    #[test]
    fn busy_does_not_strike() {
        let source = ScriptedSource::new(b"")
            .then(Err(SourceError::Busy("locked".into())))
            .then(Err(SourceError::Busy("locked".into())));
        let mut driver = TailDriver::new(source, &settings());

        assert_eq!(driver.tick(Instant::now()), TickOutcome::Busy);
        assert_eq!(driver.tick(Instant::now()), TickOutcome::Busy);
        assert_eq!(driver.cursor().consecutive_failures, 0);
        assert!(!driver.cursor().is_reading);
    }

    #[test]
    fn io_errors_do_not_strike() {
        let source = ScriptedSource::new(b"")
            .then(Err(SourceError::Io(io::Error::other("disk"))));
        let mut driver = TailDriver::new(source, &settings());
        assert_eq!(driver.tick(Instant::now()), TickOutcome::Failed { strikes: 0 });
    }

    #[test]
    fn stops_after_threshold_and_recovers_on_reconnect() {
        let mut config = settings();
        config.set_failure_threshold(3);
        let source = ScriptedSource::new(b"x\n").then(lost()).then(lost()).then(lost());
        let mut driver = TailDriver::new(source, &config);

        assert_eq!(driver.tick(Instant::now()), TickOutcome::Failed { strikes: 1 });
        assert_eq!(driver.tick(Instant::now()), TickOutcome::Failed { strikes: 2 });
        assert_eq!(driver.tick(Instant::now()), TickOutcome::Stopped);
        assert!(driver.is_stopped());
        assert_eq!(driver.tick(Instant::now()), TickOutcome::Stopped);

        assert_eq!(driver.reconnect().unwrap(), 2);
        assert!(!driver.is_stopped());
        assert_eq!(driver.cursor().consecutive_failures, 0);
    }

    #[test]
    fn success_resets_strikes() {
        let source = ScriptedSource::new(b"").then(lost()).then(lost()).then(Ok(0));
        let mut driver = TailDriver::new(source, &settings());
        driver.tick(Instant::now());
        driver.tick(Instant::now());
        assert_eq!(driver.cursor().consecutive_failures, 2);

        assert_eq!(driver.tick(Instant::now()), TickOutcome::Idle);
        assert_eq!(driver.cursor().consecutive_failures, 0);
    }

    #[test]
    fn in_flight_flag_skips_then_clears_when_stale() {
        let source = ScriptedSource::new(b"line\n");
        let mut driver = TailDriver::new(source, &settings());
        let start = Instant::now();
        driver.cursor.is_reading = true;
        driver.cursor.read_started = Some(start);

        assert_eq!(driver.tick(start + Duration::from_millis(500)), TickOutcome::Skipped);

        let outcome = driver.tick(start + Duration::from_millis(2_500));
        assert_eq!(outcome, TickOutcome::Read { lines: vec!["line".into()] });
        assert!(!driver.cursor().is_reading);
    }

    #[test]
    fn poll_interval_gates_ticks() {
        let source = ScriptedSource::new(b"");
        let mut driver = TailDriver::new(source, &settings());
        let start = Instant::now();
        assert!(driver.is_due(start));
        driver.tick(start);
        assert!(!driver.is_due(start + Duration::from_millis(400)));
        assert!(driver.is_due(start + Duration::from_millis(1_000)));
    }
}

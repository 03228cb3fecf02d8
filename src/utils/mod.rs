pub mod persistence;
pub mod time;

pub use persistence::{JsonPersistence, NoopPersistence, PersistenceSink};
pub use time::{format_compact, format_elapsed, local_time_label, now_ms};

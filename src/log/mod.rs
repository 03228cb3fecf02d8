pub mod finder;
pub mod source;
pub mod watcher;

pub use finder::{default_log_path, is_chat_log, resolve_log_path};
pub use source::{FileLogSource, LogSource};
pub use watcher::{TailCursor, TailDriver, TickOutcome};

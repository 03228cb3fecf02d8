pub mod app;
pub mod chat_window;
pub mod helpers;
pub mod session_window;
pub mod ui;

pub use app::{Intent, MeterApp};
pub use chat_window::{show_chat_window, ChatWindowState};
pub use session_window::{show_session_window, SessionWindowState};

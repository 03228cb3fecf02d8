pub mod chat;
pub mod classifier;
pub mod combat;
pub mod locale;
pub mod loot;
pub mod processor;
pub mod regex;
pub mod session;

pub use chat::parse_chat_line;
pub use classifier::{classify, is_fight_end, LineKind};
pub use combat::{process_fight_content, CombatContext, CombatOutcome};
pub use processor::{LineOutcome, Meter, MeterView};
pub use session::{NoProgress, ProgressTracker, SessionRecap};

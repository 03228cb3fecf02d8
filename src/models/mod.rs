pub mod aggregate;
pub mod chat;
pub mod combat;
pub mod loot;
pub mod reference;
pub mod roster;
pub mod session;
pub mod settings;
pub mod snapshot;

pub use aggregate::{AbilityEntry, ActorAggregate, ChannelStore, CombatStores, StoreKind};
pub use chat::{ChatCategory, ChatFilter, ChatMessage, Highlight, Span};
pub use combat::{AttributionState, CombatAction, CombatChannel, Element, FightClock, PendingArmorLoss};
pub use loot::{ItemTracker, LootProgress, TrackedItem};
pub use reference::{ReferenceData, ReferenceFile};
pub use roster::{Allegiance, Roster};
pub use session::{SessionEvent, SessionStats};
pub use settings::AppSettings;
pub use snapshot::{FightHistory, FightSnapshot, LiveFight};

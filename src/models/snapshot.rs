use std::collections::{BTreeMap, VecDeque};
use serde::{Deserialize, Serialize};
use crate::models::aggregate::{ChannelStore, CombatStores, StoreKind};
use crate::models::combat::FightClock;
use crate::models::reference::ReferenceData;
use crate::models::roster::{Allegiance, Roster, resolve_ally};

pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Frozen copy of a finished fight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightSnapshot {
    pub damage: ChannelStore,
    pub healing: ChannelStore,
    pub armor: ChannelStore,
    pub classes: BTreeMap<String, String>,
    pub overrides: BTreeMap<String, Allegiance>,
    pub timestamp: String,
}

impl FightSnapshot {
    pub fn capture(stores: &CombatStores, roster: &Roster, timestamp: String) -> Self {
        Self {
            damage: stores.damage.clone(),
            healing: stores.healing.clone(),
            armor: stores.armor.clone(),
            classes: roster.classes.clone(),
            overrides: roster.overrides.clone(),
            timestamp,
        }
    }

    pub fn store(&self, kind: StoreKind) -> &ChannelStore {
        match kind {
            StoreKind::Damage => &self.damage,
            StoreKind::Healing => &self.healing,
            StoreKind::Armor => &self.armor,
        }
    }

    /// Ally bucketing with the maps frozen at capture time.
    pub fn is_player_ally(&self, name: &str, reference: &ReferenceData) -> bool {
        resolve_ally(name, &self.classes, &self.overrides, reference)
    }

    pub fn total_damage(&self) -> u64 {
        self.damage.grand_total()
    }
}

/// Bounded list of snapshots, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightHistory {
    entries: VecDeque<FightSnapshot>,
    capacity: usize,
}

impl Default for FightHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl FightHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn from_entries(entries: Vec<FightSnapshot>, capacity: usize) -> Self {
        let mut history = Self::with_capacity(capacity);
        history.entries = entries.into_iter().take(history.capacity).collect();
        history
    }

    pub fn push(&mut self, snapshot: FightSnapshot) {
        self.entries.push_front(snapshot);
        self.entries.truncate(self.capacity);
    }

    pub fn get(&self, index: usize) -> Option<&FightSnapshot> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FightSnapshot> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_vec(&self) -> Vec<FightSnapshot> {
        self.entries.iter().cloned().collect()
    }
}

/// The fight in progress, written on exit and restored at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveFight {
    pub stores: CombatStores,
    pub clock: FightClock,
    pub awaiting_new_fight: bool,
    /// Whether the fight still has to be written to history.
    pub unsaved: bool,
}

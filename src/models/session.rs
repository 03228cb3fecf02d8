use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

pub const COMBAT_CATEGORY: &str = "Combat";

pub const PROFESSIONS: &[&str] = &[
    "Armorer",
    "Baker",
    "Chef",
    "Handyman",
    "Jeweler",
    "Leather Dealer",
    "Tailor",
    "Weapons Master",
    "Farmer",
    "Fisherman",
    "Herbalist",
    "Lumberjack",
    "Miner",
    "Trapper",
];

/// Older saves used the singular spelling.
const LEGACY_WEAPON_MASTER: &str = "Weapon Master";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KamaTally {
    pub earned: u64,
    pub spent: u64,
}

impl KamaTally {
    pub fn net(&self) -> i64 {
        self.earned as i64 - self.spent as i64
    }
}

/// One progress delta extracted from a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    KamasEarned(u64),
    KamasSpent(u64),
    Xp { category: String, amount: u64 },
    QuestCompleted,
    ChallengeCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub kamas: KamaTally,
    pub quests: u32,
    pub challenges: u32,
    pub xp: BTreeMap<String, u64>,
    /// Unix milliseconds of the first progress event of the session.
    #[serde(default)]
    pub started_at_ms: Option<i64>,
}

impl Default for SessionStats {
    fn default() -> Self {
        let mut xp = BTreeMap::new();
        xp.insert(COMBAT_CATEGORY.to_string(), 0);
        for profession in PROFESSIONS {
            xp.insert(profession.to_string(), 0);
        }
        Self {
            kamas: KamaTally::default(),
            quests: 0,
            challenges: 0,
            xp,
            started_at_ms: None,
        }
    }
}

impl SessionStats {
    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::KamasEarned(amount) => self.kamas.earned += amount,
            SessionEvent::KamasSpent(amount) => self.kamas.spent += amount,
            SessionEvent::Xp { category, amount } => {
                *self.xp.entry(category.clone()).or_insert(0) += amount;
            }
            SessionEvent::QuestCompleted => self.quests += 1,
            SessionEvent::ChallengeCompleted => self.challenges += 1,
        }
    }

    /// Zeroes every counter and restarts the session clock at `now_ms`.
    pub fn reset(&mut self, now_ms: i64) {
        self.kamas = KamaTally::default();
        self.quests = 0;
        self.challenges = 0;
        for value in self.xp.values_mut() {
            *value = 0;
        }
        self.started_at_ms = Some(now_ms);
    }

    /// Folds a loaded save into the seeded categories, dropping unknown keys.
    pub fn merge_loaded(loaded: SessionStats) -> SessionStats {
        let mut stats = SessionStats::default();
        stats.kamas = loaded.kamas;
        stats.quests = loaded.quests;
        stats.challenges = loaded.challenges;
        stats.started_at_ms = loaded.started_at_ms;
        for (key, value) in loaded.xp {
            let key = if key == LEGACY_WEAPON_MASTER { "Weapons Master".to_string() } else { key };
            if let Some(slot) = stats.xp.get_mut(&key) {
                *slot += value;
            }
        }
        stats
    }

    /// XP rows worth showing: Combat first, then alphabetical, zeroes skipped.
    pub fn xp_rows(&self) -> Vec<(&str, u64)> {
        let mut rows: Vec<(&str, u64)> = self
            .xp
            .iter()
            .filter(|(_, v)| **v > 0)
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        rows.sort_by(|a, b| match (a.0 == COMBAT_CATEGORY, b.0 == COMBAT_CATEGORY) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a.0.cmp(b.0),
        });
        rows
    }

    pub fn elapsed_ms(&self, now_ms: i64) -> Option<i64> {
        self.started_at_ms.map(|start| (now_ms - start).max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_seed_combat_and_professions() {
        let stats = SessionStats::default();
        assert_eq!(stats.xp.len(), PROFESSIONS.len() + 1);
        assert_eq!(stats.xp[COMBAT_CATEGORY], 0);
    }

    #[test]
    fn loaded_legacy_weapon_master_is_folded() {
        let mut loaded = SessionStats::default();
        loaded.xp.insert("Weapon Master".into(), 40);
        loaded.xp.insert("Weapons Master".into(), 2);
        loaded.xp.insert("Astrologer".into(), 99);
        let merged = SessionStats::merge_loaded(loaded);
        assert_eq!(merged.xp["Weapons Master"], 42);
        assert!(!merged.xp.contains_key("Astrologer"));
    }

    #[test]
    fn xp_rows_put_combat_first() {
        let mut stats = SessionStats::default();
        stats.apply(&SessionEvent::Xp { category: "Miner".into(), amount: 5 });
        stats.apply(&SessionEvent::Xp { category: "Baker".into(), amount: 5 });
        stats.apply(&SessionEvent::Xp { category: COMBAT_CATEGORY.into(), amount: 1 });
        let names: Vec<&str> = stats.xp_rows().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["Combat", "Baker", "Miner"]);
    }

    #[test]
    fn net_kamas_can_go_negative() {
        let mut stats = SessionStats::default();
        stats.apply(&SessionEvent::KamasEarned(100));
        stats.apply(&SessionEvent::KamasSpent(250));
        assert_eq!(stats.kamas.net(), -150);
    }
}

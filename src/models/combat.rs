use std::fmt;
use serde::{Deserialize, Serialize};

/// Ability name used when no cast has been seen since the last reset.
pub const UNKNOWN_ABILITY: &str = "Unknown Spell";
/// Ability name used after a turn carryover clears the tracked cast.
pub const PASSIVE_ABILITY: &str = "Passive / Indirect";
/// Ability name given to heals re-attributed from an ally to an enemy target.
pub const MECHANIC_ABILITY: &str = "Mechanic / Passive";
/// Caster label the game uses for map mechanics; never rerouted by class.
pub const DUNGEON_MECHANIC: &str = "Dungeon Mechanic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Water,
    Earth,
    Air,
    Light,
    Stasis,
    Neutral,
}

impl Element {
    pub const ALL: [Element; 7] = [
        Element::Fire,
        Element::Water,
        Element::Earth,
        Element::Air,
        Element::Light,
        Element::Stasis,
        Element::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Fire => "Fire",
            Element::Water => "Water",
            Element::Earth => "Earth",
            Element::Air => "Air",
            Element::Light => "Light",
            Element::Stasis => "Stasis",
            Element::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatChannel {
    Damage,
    Heal,
    ArmorGain,
    ArmorLoss,
}

/// One resolved combat event, produced per fight line and folded immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatAction {
    pub channel: CombatChannel,
    pub actor: String,
    pub ability: String,
    pub amount: u64,
    pub element: Option<Element>,
    pub target: String,
}

/// A shield break waiting for the next line to disclose its element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingArmorLoss {
    pub caster: String,
    pub ability: String,
    pub amount: u64,
    pub target: String,
}

impl PendingArmorLoss {
    pub fn into_action(self, element: Element) -> CombatAction {
        CombatAction {
            channel: CombatChannel::ArmorLoss,
            actor: self.caster,
            ability: self.ability,
            amount: self.amount,
            element: Some(element),
            target: self.target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionState {
    pub current_caster: Option<String>,
    pub current_ability: String,
    pub pending_armor_loss: Option<PendingArmorLoss>,
    pub awaiting_new_fight: bool,
}

impl Default for AttributionState {
    fn default() -> Self {
        Self {
            current_caster: None,
            current_ability: UNKNOWN_ABILITY.to_string(),
            pending_armor_loss: None,
            awaiting_new_fight: false,
        }
    }
}

impl AttributionState {
    /// Forget the tracked cast at a turn boundary.
    pub fn clear_cast(&mut self) {
        self.current_caster = None;
        self.current_ability = PASSIVE_ABILITY.to_string();
    }

    pub fn take_pending(&mut self) -> Option<PendingArmorLoss> {
        self.pending_armor_loss.take()
    }
}

/// Fight timing in Unix milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightClock {
    pub started_ms: Option<i64>,
    pub last_activity_ms: Option<i64>,
}

impl FightClock {
    pub fn mark_started(&mut self, now_ms: i64) {
        self.started_ms.get_or_insert(now_ms);
    }

    pub fn mark_activity(&mut self, now_ms: i64) {
        self.last_activity_ms = Some(now_ms);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// `MM:SS` from the first hit to the last activity, or to `now_ms` while
    /// no later activity has been seen.
    pub fn duration_label(&self, now_ms: i64) -> String {
        let Some(start) = self.started_ms else {
            return "00:00".to_string();
        };
        let end = match self.last_activity_ms {
            Some(last) if last > start => last,
            _ => now_ms,
        };
        let secs = (end - start).max(0) / 1000;
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_cast_uses_passive_sentinel() {
        let mut state = AttributionState {
            current_caster: Some("Alice".into()),
            current_ability: "Fireball".into(),
            ..AttributionState::default()
        };
        state.clear_cast();
        assert_eq!(state.current_caster, None);
        assert_eq!(state.current_ability, PASSIVE_ABILITY);
    }

    #[test]
    fn clock_keeps_first_start() {
        let mut clock = FightClock::default();
        assert_eq!(clock.duration_label(5_000), "00:00");
        clock.mark_started(1_000);
        clock.mark_started(9_000);
        clock.mark_activity(76_000);
        assert_eq!(clock.started_ms, Some(1_000));
        assert_eq!(clock.duration_label(500_000), "01:15");
    }
}

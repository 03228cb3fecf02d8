use std::collections::{BTreeMap, HashMap};
use serde::{Deserialize, Serialize};
use crate::models::reference::ReferenceData;

/// Name fragments that look like enemy families but belong to player characters.
const ENEMY_FAMILY_EXCEPTIONS: &[&str] = &["Punchy", "Papas"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Allegiance {
    Ally,
    Enemy,
}

/// Durable knowledge about actors that survives fight resets.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub classes: BTreeMap<String, String>,              // actor -> class
    pub overrides: BTreeMap<String, Allegiance>,        // actor -> manual bucket
    pub summon_bindings: BTreeMap<String, String>,      // summon -> master
    /// Actors in the order their class was first detected.
    #[serde(default)]
    detection_order: Vec<String>,
    #[serde(skip)]
    label_cache: HashMap<String, String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the class implied by `ability` unless `actor` is a known monster.
    /// Returns true when the stored class changed.
    pub fn detect_class(&mut self, actor: &str, ability: &str, reference: &ReferenceData) -> bool {
        if reference.is_monster(actor) {
            return false;
        }
        let Some(class) = reference.class_of(ability) else {
            return false;
        };
        if self.classes.get(actor).map(String::as_str) == Some(class) {
            return false;
        }
        if self.classes.insert(actor.to_string(), class.to_string()).is_none() {
            self.detection_order.push(actor.to_string());
        }
        self.invalidate_label(actor);
        true
    }

    pub fn class_of(&self, actor: &str) -> Option<&str> {
        self.classes.get(actor).map(String::as_str)
    }

    /// Earliest detected actor of `class`. Entries inserted without
    /// detection fall back to name order.
    pub fn first_with_class(&self, class: &str) -> Option<&str> {
        self.detection_order
            .iter()
            .map(String::as_str)
            .find(|name| self.class_of(name) == Some(class))
            .or_else(|| {
                self.classes
                    .iter()
                    .find(|(_, c)| c.as_str() == class)
                    .map(|(name, _)| name.as_str())
            })
    }

    pub fn set_override(&mut self, actor: &str, allegiance: Allegiance) {
        self.overrides.insert(actor.to_string(), allegiance);
    }

    pub fn clear_override(&mut self, actor: &str) {
        self.overrides.remove(actor);
    }

    pub fn bind_summon(&mut self, summon: &str, master: &str) {
        self.summon_bindings.insert(summon.to_string(), master.to_string());
        self.invalidate_label(master);
    }

    pub fn master_of(&self, summon: &str) -> Option<&str> {
        self.summon_bindings.get(summon).map(String::as_str)
    }

    pub fn is_player_ally(&self, name: &str, reference: &ReferenceData) -> bool {
        resolve_ally(name, &self.classes, &self.overrides, reference)
    }

    pub fn invalidate_label(&mut self, actor: &str) {
        self.label_cache.remove(actor);
    }

    pub fn clear_label_cache(&mut self) {
        self.label_cache.clear();
    }

    /// Display label with the detected class, cached until the class changes.
    pub fn display_label(&mut self, actor: &str) -> String {
        if let Some(label) = self.label_cache.get(actor) {
            return label.clone();
        }
        let label = match self.classes.get(actor) {
            Some(class) => format!("[{}] {}", class, actor),
            None => actor.to_string(),
        };
        self.label_cache.insert(actor.to_string(), label.clone());
        label
    }
}

/// Ally/enemy bucketing. Order matters: manual overrides, then monster
/// identity, then enemy families, then class evidence, then summons.
pub fn resolve_ally(
    name: &str,
    classes: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, Allegiance>,
    reference: &ReferenceData,
) -> bool {
    if let Some(allegiance) = overrides.get(name) {
        return *allegiance == Allegiance::Ally;
    }
    if reference.is_monster(name) {
        return false;
    }
    if reference.is_enemy_family(name)
        || ENEMY_FAMILY_EXCEPTIONS.iter().any(|fragment| name.contains(fragment))
    {
        return false;
    }
    if classes.contains_key(name) {
        return true;
    }
    reference.is_ally_summon(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ReferenceData {
        ReferenceData::new()
            .with_class_abilities("iop", &["Jump"])
            .with_monsters(&["Gobball"])
            .with_enemy_families(&["Crackler"])
            .with_ally_summons(&["Tofu"])
    }

    #[test]
    fn manual_override_outranks_class_evidence() {
        let reference = reference();
        let mut roster = Roster::new();
        roster.detect_class("Alice", "Jump", &reference);
        assert!(roster.is_player_ally("Alice", &reference));

        roster.set_override("Alice", Allegiance::Enemy);
        assert!(!roster.is_player_ally("Alice", &reference));
    }

    #[test]
    fn monsters_never_receive_a_class() {
        let reference = reference();
        let mut roster = Roster::new();
        assert!(!roster.detect_class("gobball", "Jump", &reference));
        assert!(roster.class_of("gobball").is_none());
        assert!(!roster.is_player_ally("Gobball", &reference));
    }

    #[test]
    fn detect_class_is_idempotent() {
        let reference = reference();
        let mut roster = Roster::new();
        assert!(roster.detect_class("Alice", "Jump", &reference));
        assert!(!roster.detect_class("Alice", "Jump", &reference));
        assert!(!roster.detect_class("Alice", "Unknown", &reference));
        assert_eq!(roster.class_of("Alice"), Some("iop"));
    }

    #[test]
    fn first_with_class_follows_detection_order() {
        let reference = reference();
        let mut roster = Roster::new();
        roster.detect_class("Zed", "Jump", &reference);
        roster.detect_class("Alice", "Jump", &reference);
        assert_eq!(roster.first_with_class("iop"), Some("Zed"));

        let mut legacy = Roster::new();
        legacy.classes.insert("Zed".into(), "iop".into());
        legacy.classes.insert("Alice".into(), "iop".into());
        assert_eq!(legacy.first_with_class("iop"), Some("Alice"));
        assert_eq!(legacy.first_with_class("sram"), None);
    }

    #[test]
    fn enemy_family_beats_class_map() {
        let reference = reference();
        let mut roster = Roster::new();
        roster.classes.insert("Crackler Jr".into(), "iop".into());
        roster.classes.insert("Punchy".into(), "iop".into());
        assert!(!roster.is_player_ally("Crackler Jr", &reference));
        assert!(!roster.is_player_ally("Punchy", &reference));
    }

    #[test]
    fn summons_and_defaults() {
        let reference = reference();
        let roster = Roster::new();
        assert!(roster.is_player_ally("Tofu", &reference));
        assert!(!roster.is_player_ally("Stranger", &reference));
    }

    #[test]
    fn display_label_refreshes_after_class_change() {
        let reference = reference();
        let mut roster = Roster::new();
        assert_eq!(roster.display_label("Alice"), "Alice");
        roster.detect_class("Alice", "Jump", &reference);
        assert_eq!(roster.display_label("Alice"), "[iop] Alice");
    }
}

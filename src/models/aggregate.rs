use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::models::combat::{CombatAction, CombatChannel, Element};

/// Composite key for one ability/element bucket of an actor.
pub fn ability_key(ability: &str, element: Option<Element>) -> String {
    format!("{}|{}", ability, element.map(|e| e.as_str()).unwrap_or("neutral"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityEntry {
    pub value: u64,
    pub element: Option<Element>,
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorAggregate {
    pub name: String,
    pub total: u64,
    pub abilities: HashMap<String, AbilityEntry>, // "ability|element" -> entry
}

impl ActorAggregate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total: 0,
            abilities: HashMap::new(),
        }
    }

    pub fn add(&mut self, ability: &str, element: Option<Element>, amount: u64) {
        self.total = self.total.saturating_add(amount);
        let entry = self
            .abilities
            .entry(ability_key(ability, element))
            .or_insert_with(|| AbilityEntry {
                value: 0,
                element,
                display_name: ability.to_string(),
            });
        entry.value = entry.value.saturating_add(amount);
    }

    pub fn abilities_sum(&self) -> u64 {
        self.abilities.values().fold(0u64, |sum, a| sum.saturating_add(a.value))
    }

    /// Abilities sorted by contribution, highest first.
    pub fn sorted_abilities(&self) -> Vec<&AbilityEntry> {
        let mut entries: Vec<&AbilityEntry> = self.abilities.values().collect();
        entries.sort_by(|a, b| {
            b.value
                .cmp(&a.value)
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        entries
    }
}

/// Per-channel map of actor name to running totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelStore {
    actors: HashMap<String, ActorAggregate>,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, actor: &str, ability: &str, amount: u64, element: Option<Element>) {
        self.actors
            .entry(actor.to_string())
            .or_insert_with(|| ActorAggregate::new(actor))
            .add(ability, element, amount);
    }

    /// Moves a summon's totals under its master, renaming each ability to
    /// `"<ability> (<summon>)"`. Returns false when the summon had no entry.
    pub fn merge_summon(&mut self, summon: &str, master: &str) -> bool {
        if summon == master {
            return false;
        }
        let Some(summon_entry) = self.actors.remove(summon) else {
            return false;
        };

        let master_entry = self
            .actors
            .entry(master.to_string())
            .or_insert_with(|| ActorAggregate::new(master));
        master_entry.total = master_entry.total.saturating_add(summon_entry.total);

        for entry in summon_entry.abilities.into_values() {
            let renamed = format!("{} ({})", entry.display_name, summon);
            let merged = master_entry
                .abilities
                .entry(ability_key(&renamed, entry.element))
                .or_insert_with(|| AbilityEntry {
                    value: 0,
                    element: entry.element,
                    display_name: renamed.clone(),
                });
            merged.value = merged.value.saturating_add(entry.value);
        }
        true
    }

    pub fn get(&self, actor: &str) -> Option<&ActorAggregate> {
        self.actors.get(actor)
    }

    pub fn contains(&self, actor: &str) -> bool {
        self.actors.contains_key(actor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorAggregate> {
        self.actors.values()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn clear(&mut self) {
        self.actors.clear();
    }

    pub fn grand_total(&self) -> u64 {
        self.actors.values().fold(0u64, |sum, a| sum.saturating_add(a.total))
    }

    /// Actors sorted by total, highest first, ties broken by name.
    pub fn sorted_by_total(&self) -> Vec<&ActorAggregate> {
        let mut actors: Vec<&ActorAggregate> = self.actors.values().collect();
        actors.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
        actors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StoreKind {
    #[default]
    Damage,
    Healing,
    Armor,
}

impl StoreKind {
    pub const ALL: [StoreKind; 3] = [StoreKind::Damage, StoreKind::Healing, StoreKind::Armor];

    pub fn label(&self) -> &'static str {
        match self {
            StoreKind::Damage => "DMG",
            StoreKind::Healing => "HEALING",
            StoreKind::Armor => "ARMOR",
        }
    }
}

/// The three live channels of the current fight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStores {
    pub damage: ChannelStore,
    pub healing: ChannelStore,
    pub armor: ChannelStore,
    /// Set on every fold, cleared when the fight is written to history.
    #[serde(skip)]
    pub dirty: bool,
}

impl CombatStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, kind: StoreKind) -> &ChannelStore {
        match kind {
            StoreKind::Damage => &self.damage,
            StoreKind::Healing => &self.healing,
            StoreKind::Armor => &self.armor,
        }
    }

    pub fn fold_action(&mut self, action: &CombatAction) {
        let store = match action.channel {
            CombatChannel::Damage | CombatChannel::ArmorLoss => &mut self.damage,
            CombatChannel::Heal => &mut self.healing,
            CombatChannel::ArmorGain => &mut self.armor,
        };
        store.fold(&action.actor, &action.ability, action.amount, action.element);
        self.dirty = true;
    }

    /// Applies a summon binding to all three channels independently.
    pub fn merge_summon(&mut self, summon: &str, master: &str) -> bool {
        let damage = self.damage.merge_summon(summon, master);
        let healing = self.healing.merge_summon(summon, master);
        let armor = self.armor.merge_summon(summon, master);
        damage || healing || armor
    }

    pub fn is_empty(&self) -> bool {
        self.damage.is_empty() && self.healing.is_empty() && self.armor.is_empty()
    }

    pub fn clear(&mut self) {
        self.damage.clear();
        self.healing.clear();
        self.armor.clear();
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_totals_consistent(store: &ChannelStore) {
        for actor in store.iter() {
            assert_eq!(actor.total, actor.abilities_sum(), "total drifted for {}", actor.name);
        }
    }

    #[test]
    fn fold_creates_actor_and_ability_buckets() {
        let mut store = ChannelStore::new();
        store.fold("Alice", "Fireball", 1500, Some(Element::Fire));
        store.fold("Alice", "Fireball", 500, Some(Element::Fire));
        store.fold("Alice", "Fireball", 200, Some(Element::Neutral));

        let alice = store.get("Alice").unwrap();
        assert_eq!(alice.total, 2200);
        assert_eq!(alice.abilities["Fireball|Fire"].value, 2000);
        assert_eq!(alice.abilities["Fireball|Neutral"].value, 200);
        assert_totals_consistent(&store);
    }

    #[test]
    fn elementless_entries_use_neutral_key() {
        let mut store = ChannelStore::new();
        store.fold("Alice", "Shield", 40, None);
        let entry = &store.get("Alice").unwrap().abilities["Shield|neutral"];
        assert_eq!(entry.element, None);
        assert_eq!(entry.display_name, "Shield");
    }

    #[test]
    fn merge_summon_preserves_totals_and_renames_abilities() {
        let mut store = ChannelStore::new();
        store.fold("Tofu", "Peck", 300, Some(Element::Air));
        store.fold("Tofu", "Peck", 100, Some(Element::Air));
        store.fold("Alice", "Fireball", 1000, Some(Element::Fire));
        store.fold("Alice", "Peck (Tofu)", 50, Some(Element::Air));

        assert!(store.merge_summon("Tofu", "Alice"));

        assert!(!store.contains("Tofu"));
        let alice = store.get("Alice").unwrap();
        assert_eq!(alice.total, 1450);
        assert_eq!(alice.abilities["Peck (Tofu)|Air"].value, 450);
        assert_totals_consistent(&store);
    }

    #[test]
    fn oversized_amounts_saturate_instead_of_wrapping() {
        let mut store = ChannelStore::new();
        store.fold("Alice", "Fireball", u64::MAX, Some(Element::Fire));
        store.fold("Alice", "Fireball", 1, Some(Element::Fire));
        store.fold("Alice", "Jump", 5, None);
        store.fold("Tofu", "Bite", u64::MAX, None);
        assert!(store.merge_summon("Tofu", "Alice"));

        let alice = store.get("Alice").unwrap();
        assert_eq!(alice.total, u64::MAX);
        assert_eq!(alice.abilities["Fireball|Fire"].value, u64::MAX);
        assert_eq!(store.grand_total(), u64::MAX);
        assert_totals_consistent(&store);
    }

    #[test]
    fn merge_summon_creates_missing_master() {
        let mut store = ChannelStore::new();
        store.fold("Coney", "Bite", 70, Some(Element::Earth));
        assert!(store.merge_summon("Coney", "Bob"));
        assert_eq!(store.get("Bob").unwrap().total, 70);
        assert!(!store.merge_summon("Coney", "Bob"));
    }

    #[test]
    fn armor_loss_lands_in_damage_channel() {
        let mut stores = CombatStores::new();
        stores.fold_action(&CombatAction {
            channel: CombatChannel::ArmorLoss,
            actor: "Bob".into(),
            ability: "Unknown Spell".into(),
            amount: 300,
            element: Some(Element::Water),
            target: "Bob".into(),
        });
        assert!(stores.dirty);
        assert_eq!(stores.damage.get("Bob").unwrap().total, 300);
        assert!(stores.armor.is_empty());
    }

    #[test]
    fn sorted_by_total_is_descending() {
        let mut store = ChannelStore::new();
        store.fold("A", "x", 10, None);
        store.fold("B", "x", 30, None);
        store.fold("C", "x", 20, None);
        let names: Vec<&str> = store.sorted_by_total().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
        assert_eq!(store.grand_total(), 60);
    }
}

use std::collections::{BTreeMap, HashMap, HashSet};
use serde::{Deserialize, Serialize};

/// Sadida toxins and doll effects that the class tables do not list.
const SADIDA_EXTRAS: &[&str] = &[
    "Harmless Toxin",
    "Toxine inoffensive",
    "Toxina inofensiva",
    "Tetatoxin",
    "Tétatoxine",
    "Venomous",
    "Venimeux",
    "Liquid Ghoul",
    "Sadida Nettled",
    "Nettled",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonsterEntry {
    #[serde(rename = "nameEN", default)]
    pub name_en: Option<String>,
    #[serde(rename = "nameFR", default)]
    pub name_fr: Option<String>,
    #[serde(rename = "nameES", default)]
    pub name_es: Option<String>,
    #[serde(rename = "namePT", default)]
    pub name_pt: Option<String>,
}

/// On-disk layout of the static game tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceFile {
    /// class -> locale -> localized ability names
    #[serde(default)]
    pub class_spells: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub monsters: Vec<MonsterEntry>,
    #[serde(default)]
    pub enemy_families: Vec<String>,
    #[serde(default)]
    pub ally_summons: Vec<String>,
}

/// Indexed lookups over the static ability, monster and summon tables.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    ability_to_class: HashMap<String, String>,
    known_abilities: Vec<String>,
    monsters: HashSet<String>,
    enemy_families: Vec<String>,
    ally_summons: HashSet<String>,
}

impl ReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables shipped with the binary when no reference file is available.
    pub fn builtin() -> Self {
        Self::new()
            .with_class_abilities("sadida", SADIDA_EXTRAS)
            .with_class_abilities("ecaflip", &["Blackjack"])
    }

    pub fn from_file(file: ReferenceFile) -> Self {
        let mut data = Self::new();
        for (class, locales) in &file.class_spells {
            for names in locales.values() {
                for name in names {
                    data.insert_ability(name, class);
                }
            }
        }
        for monster in &file.monsters {
            for name in [&monster.name_en, &monster.name_fr, &monster.name_es, &monster.name_pt]
                .into_iter()
                .flatten()
            {
                data.monsters.insert(name.to_lowercase());
            }
        }
        data.enemy_families = file.enemy_families.iter().map(|f| f.to_lowercase()).collect();
        data.ally_summons = file.ally_summons.into_iter().collect();

        // Manual injections always win over the generated tables.
        data.with_class_abilities("sadida", SADIDA_EXTRAS)
            .with_class_abilities("ecaflip", &["Blackjack"])
    }

    fn insert_ability(&mut self, name: &str, class: &str) {
        if self
            .ability_to_class
            .insert(name.to_string(), class.to_string())
            .is_none()
        {
            self.known_abilities.push(name.to_string());
        }
    }

    pub fn with_class_abilities(mut self, class: &str, abilities: &[&str]) -> Self {
        for ability in abilities {
            self.insert_ability(ability, class);
        }
        self
    }

    pub fn with_monsters(mut self, names: &[&str]) -> Self {
        self.monsters.extend(names.iter().map(|n| n.to_lowercase()));
        self
    }

    pub fn with_enemy_families(mut self, families: &[&str]) -> Self {
        self.enemy_families.extend(families.iter().map(|f| f.to_lowercase()));
        self
    }

    pub fn with_ally_summons(mut self, names: &[&str]) -> Self {
        self.ally_summons.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn class_of(&self, ability: &str) -> Option<&str> {
        self.ability_to_class.get(ability).map(String::as_str)
    }

    /// Every localized ability name, in table order.
    pub fn known_abilities(&self) -> &[String] {
        &self.known_abilities
    }

    /// Resolves a parenthesised detail token to a known ability: an exact
    /// name first, otherwise the longest known name contained in the token.
    pub fn match_ability(&self, token: &str) -> Option<&str> {
        if let Some((name, _)) = self.ability_to_class.get_key_value(token) {
            return Some(name.as_str());
        }
        self.known_abilities
            .iter()
            .filter(|name| !name.is_empty() && token.contains(name.as_str()))
            .max_by_key(|name| name.len())
            .map(String::as_str)
    }

    pub fn is_monster(&self, name: &str) -> bool {
        self.monsters.contains(&name.trim().to_lowercase())
    }

    pub fn is_enemy_family(&self, name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        self.enemy_families.iter().any(|family| lower.contains(family.as_str()))
    }

    pub fn is_ally_summon(&self, name: &str) -> bool {
        self.ally_summons.contains(name)
    }

    pub fn ability_count(&self) -> usize {
        self.known_abilities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_carry_manual_injections() {
        let data = ReferenceData::builtin();
        assert_eq!(data.class_of("Tetatoxin"), Some("sadida"));
        assert_eq!(data.class_of("Blackjack"), Some("ecaflip"));
        assert_eq!(data.class_of("Fireball"), None);
    }

    #[test]
    fn reference_file_indexes_every_locale() {
        let json = r#"{
            "class_spells": { "iop": { "en": ["Jump", "Celestial Sword"], "fr": ["Bond"] } },
            "monsters": [ { "nameEN": "Gobball", "nameFR": "Bouftou" } ],
            "enemy_families": ["Crackler"],
            "ally_summons": ["Tofu"]
        }"#;
        let file: ReferenceFile = serde_json::from_str(json).unwrap();
        let data = ReferenceData::from_file(file);

        assert_eq!(data.class_of("Bond"), Some("iop"));
        assert_eq!(data.class_of("Celestial Sword"), Some("iop"));
        assert!(data.is_monster("BOUFTOU"));
        assert!(data.is_enemy_family("Mighty Crackler"));
        assert!(data.is_ally_summon("Tofu"));
        assert!(!data.is_ally_summon("tofu"));
    }

    #[test]
    fn match_ability_prefers_exact_then_longest() {
        let data = ReferenceData::new().with_class_abilities("iop", &["Sword", "Celestial Sword"]);
        assert_eq!(data.match_ability("Sword"), Some("Sword"));
        assert_eq!(data.match_ability("Celestial Sword x2"), Some("Celestial Sword"));
        assert_eq!(data.match_ability("Bow"), None);
    }
}

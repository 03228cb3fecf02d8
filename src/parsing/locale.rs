//! Per-locale literal tables (English, French, Spanish, Portuguese).
//!
//! Every multilingual check in the parsers is driven from these lists, so a
//! new locale only needs new rows here.

use crate::models::chat::ChatCategory;
use crate::models::combat::Element;

/// Bracketed channel tags that mark a fight line.
pub const FIGHT_TAGS: &[&str] = &[
    "[fight log]",
    "[information (combat)]",
    "[información (combate)]",
    "[registro de lutas]",
];

/// (tag, message) pairs; both must appear for a line to close a fight.
pub const FIGHT_END_PHRASES: &[(&str, &str)] = &[
    ("[fight log]", "fight is over"),
    ("[information (combat)]", "le combat est terminé"),
    ("[información (combate)]", "el combate ha terminado"),
    ("[registro de lutas]", "a luta terminou"),
];

pub const LOOT_PHRASES: &[&str] = &[
    "picked up",
    "ramassé",
    "obtenu",
    "recogido",
    "obtenido",
    "apanhou",
    "obteve",
];

/// Turn boundary markers.
pub const CARRYOVER_PHRASES: &[&str] = &["carried over", "tour suivant"];

/// Longest first so the alternation never stops at a prefix.
pub const CAST_VERBS: &[&str] = &[
    "lança o feitiço",
    "lanza el hechizo",
    "lance le sort",
    "casts",
    "lance",
    "lanza",
    "lança",
];

pub const HP_UNITS: &[&str] = &["HP", "PdV", "PV"];
pub const ARMOR_UNITS: &[&str] = &["Armor", "Armadura", "Armure"];

/// Decoys and devices that announce casts but never own damage.
pub const NON_COMBATANTS: &[&str] = &[
    "Gobgob",
    "Beacon",
    "Balise",
    "Standard-Bearing Puppet",
    "Microbot",
    "Cybot",
    "Dial",
    "Cadran",
    "Coney",
    "Lapino",
];

pub const REFLECT_MECHANICS: &[&str] = &["Burning Armor", "Armadura Ardiente", "Reflect", "Thorns"];

pub const PRIORITY_SOURCES: &[&str] = &["Potion", "Flask", "Flasque", "Consumable"];

pub const NOISE_TOKENS: &[&str] = &[
    "Block!",
    "Critical",
    "Critical Hit",
    "Critical Hit Expert",
    "Slow Influence",
    "Backstab",
    "Sidestab",
    "Berserk",
    "Influence",
    "Dodge",
    "Lock",
    "Increased Damage",
];

/// Tokens containing this are stat-loss notices, not ability names.
pub const LOST_MARKER: &str = "lost";

/// Lowercase element names per locale.
pub const ELEMENT_NAMES: &[(Element, &[&str])] = &[
    (Element::Fire, &["fire", "feu", "fuego", "fogo"]),
    (Element::Water, &["water", "eau", "agua", "água"]),
    (Element::Earth, &["earth", "terre", "tierra", "terra"]),
    (Element::Air, &["air", "aire", "ar"]),
    (Element::Stasis, &["stasis", "stase", "estasis", "estase"]),
    (Element::Light, &["light", "lumière", "luz"]),
    (Element::Neutral, &["neutral", "neutre", "neutro"]),
];

/// Element spellings used in chat markup (capitalised, as the client prints them).
pub const MARKUP_ELEMENTS: &[(Element, &[&str])] = &[
    (Element::Fire, &["Fire", "Feu", "Fuego", "Fogo"]),
    (Element::Air, &["Air", "Aire", "Ar"]),
    (Element::Earth, &["Earth", "Terre", "Tierra", "Terra"]),
    (Element::Water, &["Water", "Eau", "Agua", "Água"]),
    (Element::Light, &["Light", "Lumière", "Luz"]),
    (Element::Stasis, &["Stasis", "Stase", "Estasis", "Estase"]),
];

pub const KAMA_VERBS: &[&str] = &[
    "won", "earned", "gained", "gagné", "ganado", "ganhou",
    "spent", "lost", "perdu", "perdio", "gasto", "gastou",
];

/// A kama line containing any of these is an expense.
pub const KAMA_SPENT_MARKERS: &[&str] = &["spent", "lost", "perdu", "perdio", "gasto"];

pub const XP_VERBS: &[&str] = &["won", "earned", "gained", "gagné", "ganado", "ganhou"];

pub const QUEST_PHRASES: &[&str] = &[
    "quest finished",
    "quest completed",
    "completed the quest",
    "finished the quest",
    "won the quest",
    "quête terminée",
    "terminé la quête",
    "misión cumplida",
    "completado la misión",
    "missão cumprida",
    "completou a missão",
];

pub const CHALLENGE_PHRASES: &[&str] = &[
    "completed the challenge",
    "challenge réussi",
    "défi réussi",
    "desafío conseguido",
    "desafio concluído",
];

pub const LEVEL_WORDS: &[&str] = &["level", "lvl", "niveau", "nivel"];

/// Channel fragments per category, checked in order. Logs comes first and
/// wins outright.
pub const CHANNEL_KEYWORDS: &[(ChatCategory, &[&str])] = &[
    (
        ChatCategory::Logs,
        &["log", "combat", "fight", "information", "información", "registro", "lutas", "error", "erreur", "erro"],
    ),
    (ChatCategory::Vicinity, &["vicinity", "proximit", "local", "vizinhança"]),
    (ChatCategory::Private, &["private", "whisper", "priv", "sussurro"]),
    (ChatCategory::Group, &["group", "groupe", "grupo"]),
    (ChatCategory::Guild, &["guild", "guilde", "gremio"]),
    (ChatCategory::Trade, &["trade", "commerce", "comercio"]),
    (ChatCategory::Community, &["community", "communaut", "comunidad", "comunidade"]),
    (ChatCategory::Recruitment, &["recruitment", "recrutement", "reclutamiento", "recrutamento"]),
    (ChatCategory::Politics, &["politic"]),
    (ChatCategory::Pvp, &["pvp", "jcj", "camp"]),
];

/// Channels whose messages get combat element markup.
pub const FIGHT_CHANNEL_MARKERS: &[&str] = &["fight log", "combat", "lutas", "information"];

/// Channel that gets kama and loot number markup.
pub const GAME_LOG_MARKER: &str = "game log";

/// Normalises an element token in any supported locale.
pub fn normalize_element(token: &str) -> Option<Element> {
    let lower = token.trim().to_lowercase();
    ELEMENT_NAMES
        .iter()
        .find(|(_, names)| names.contains(&lower.as_str()))
        .map(|(element, _)| *element)
}

/// Lowercase, contains-any check used by every keyword table.
pub fn contains_any(haystack_lower: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack_lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_normalise_across_locales() {
        assert_eq!(normalize_element("Feu"), Some(Element::Fire));
        assert_eq!(normalize_element("água"), Some(Element::Water));
        assert_eq!(normalize_element("Tierra"), Some(Element::Earth));
        assert_eq!(normalize_element(" Stase "), Some(Element::Stasis));
        assert_eq!(normalize_element("Neutre"), Some(Element::Neutral));
        assert_eq!(normalize_element("Critical"), None);
    }

    #[test]
    fn cast_verbs_are_longest_first_within_families() {
        let pos = |v: &str| CAST_VERBS.iter().position(|c| *c == v).unwrap();
        assert!(pos("lance le sort") < pos("lance"));
        assert!(pos("lanza el hechizo") < pos("lanza"));
        assert!(pos("lança o feitiço") < pos("lança"));
    }

    #[test]
    fn every_fight_end_tag_is_a_fight_tag() {
        for (tag, _) in FIGHT_END_PHRASES {
            assert!(FIGHT_TAGS.contains(tag));
        }
    }
}

use lazy_static::lazy_static;
use regex::Regex;
use crate::models::combat::Element;
use crate::parsing::locale::{
    ARMOR_UNITS, CAST_VERBS, CHALLENGE_PHRASES, HP_UNITS, KAMA_VERBS, MARKUP_ELEMENTS, QUEST_PHRASES,
    XP_VERBS,
};

fn alternation(words: &[&str]) -> String {
    words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|")
}

const NUMBER: &str = r"[\d\s.,\u{00A0}]+";

lazy_static! {
    // Combat
    pub static ref RE_CAST: Regex = Regex::new(&format!(
        r"(?i)^(?P<caster>.*?) (?:{}) (?P<ability>.*?)(?:\.|\s\(|$)",
        alternation(CAST_VERBS)
    )).unwrap();
    pub static ref RE_ACTION: Regex = Regex::new(&format!(
        r"^(?P<target>.*?): (?P<sign>[+-])?(?P<amount>[\d,.\s]+) (?P<unit>{}|{})(?P<suffix>.*)",
        alternation(HP_UNITS),
        alternation(ARMOR_UNITS)
    )).unwrap();
    pub static ref RE_ARMOR_UNIT: Regex = Regex::new(&format!(r"(?i)^(?:{})$", alternation(ARMOR_UNITS))).unwrap();
    pub static ref RE_DETAIL: Regex = Regex::new(r"\((?P<token>[^)]+)\)").unwrap();

    // Classification
    pub static ref RE_CHAT_TIMESTAMP: Regex = Regex::new(r"^\d{2}:\d{2}:\d{2}").unwrap();

    // Chat
    pub static ref RE_CHAT_BRACKET: Regex = Regex::new(r"^\[(?P<channel>.*?)\] (?P<rest>.*)").unwrap();
    pub static ref RE_WAIT: Regex = Regex::new(r"(?i)wait (?P<seconds>\d+) seconds").unwrap();
    pub static ref RE_KAMA_AMOUNT: Regex = Regex::new(r"(?i)(?P<number>\d+(?:[.,\s\u{00A0}]\d+)*)(?P<gap>[\s\u{00A0}]+)(?P<unit>kamas?)").unwrap();
    pub static ref RE_LOOT_NUMBER: Regex = Regex::new(r"\b\d+(?:[.,]\d+)*\s*x?\b").unwrap();
    pub static ref RE_QUOTED: Regex = Regex::new(r#""(?P<inner>[^"]+)""#).unwrap();
    pub static ref RE_RESISTANCE: Regex = Regex::new(r"(?i)(?P<number>[-+]?\s?[\d,.]+)(?P<label>\s+Elemental Resistance)").unwrap();
    pub static ref RE_ELEMENT_DAMAGE: Vec<(Element, Regex)> = MARKUP_ELEMENTS
        .iter()
        .map(|(element, names)| {
            let pattern = format!(
                r"(?i)(?P<amount>-\s?[\d,.]+)\s+(?P<unit>HP|PV|PdV)\s+\(\s*(?P<element>{})\s*\)",
                alternation(names)
            );
            (*element, Regex::new(&pattern).unwrap())
        })
        .collect();
    pub static ref RE_NEUTRAL_DAMAGE: Regex = Regex::new(r"(?P<amount>-\s?[\d,.]+)\s(?P<unit>HP|PV|PdV)").unwrap();
    pub static ref RE_STANDALONE_ELEMENT: Vec<(Element, Regex)> = MARKUP_ELEMENTS
        .iter()
        .map(|(element, names)| {
            let pattern = format!(r"(?i)\(\s*(?P<element>{})\s*\)", alternation(names));
            (*element, Regex::new(&pattern).unwrap())
        })
        .collect();
    pub static ref RE_LEVEL_NUMBER: Regex = Regex::new(r"[+-]?\b\d+(?:[.,]\d+)*\b").unwrap();
    pub static ref RE_PARENTHESIS: Regex = Regex::new(r"\((?P<inner>[^()]+)\)").unwrap();

    // Session progress
    pub static ref RE_KAMAS: Regex = Regex::new(&format!(
        r"(?i)(?:{})\s+(?P<amount>{})\s+kamas",
        alternation(KAMA_VERBS),
        NUMBER
    )).unwrap();
    pub static ref RE_XP: Regex = Regex::new(&format!(
        r"(?i)(?:{}|\+)\s*(?P<amount>{})\s*xp",
        alternation(XP_VERBS),
        NUMBER
    )).unwrap();
    pub static ref RE_QUEST: Regex = Regex::new(&format!(r"(?i)(?:{})", alternation(QUEST_PHRASES))).unwrap();
    pub static ref RE_CHALLENGE: Regex = Regex::new(&format!(r"(?i)(?:{})", alternation(CHALLENGE_PHRASES))).unwrap();

    // Loot
    pub static ref RE_LOOT: Regex = Regex::new(r"(?i)picked up (?P<quantity>\d+)x\s+(?P<item>[^.]+)").unwrap();
}

/// Strips digit group separators (spaces, dots, commas, NBSP) and parses.
pub fn parse_grouped_number(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_regex_prefers_long_verbs() {
        let caps = RE_CAST.captures("Alice lance le sort Boule de Feu.").unwrap();
        assert_eq!(&caps["caster"], "Alice");
        assert_eq!(&caps["ability"], "Boule de Feu");

        let caps = RE_CAST.captures("Alice casts Fireball (Critical)").unwrap();
        assert_eq!(&caps["ability"], "Fireball");
    }

    #[test]
    fn action_regex_splits_target_sign_amount_unit() {
        let caps = RE_ACTION.captures("Bob: -1,500 HP (Fire) (Critical)").unwrap();
        assert_eq!(&caps["target"], "Bob");
        assert_eq!(&caps["sign"], "-");
        assert_eq!(parse_grouped_number(&caps["amount"]), Some(1500));
        assert_eq!(&caps["unit"], "HP");
        assert_eq!(caps["suffix"].trim(), "(Fire) (Critical)");

        let caps = RE_ACTION.captures("Bob: 300 Armure").unwrap();
        assert!(caps.name("sign").is_none());
        assert_eq!(&caps["unit"], "Armure");
    }

    #[test]
    fn grouped_numbers_accept_nbsp() {
        assert_eq!(parse_grouped_number("1\u{00A0}234 567"), Some(1_234_567));
        assert_eq!(parse_grouped_number(" , "), None);
    }
}

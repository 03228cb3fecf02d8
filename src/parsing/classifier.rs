use crate::parsing::locale::{contains_any, FIGHT_END_PHRASES, FIGHT_TAGS, LOOT_PHRASES};
use crate::parsing::regex::RE_CHAT_TIMESTAMP;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Fight,
    Loot,
    Chat,
    Other,
}

/// Determines which parser owns a raw log line.
pub fn classify(line: &str) -> LineKind {
    let lower = line.to_lowercase();
    if contains_any(&lower, FIGHT_TAGS) {
        LineKind::Fight
    } else if contains_any(&lower, LOOT_PHRASES) {
        LineKind::Loot
    } else if RE_CHAT_TIMESTAMP.is_match(line) {
        LineKind::Chat
    } else {
        LineKind::Other
    }
}

/// True when a line carries both a fight tag and the matching end phrase.
pub fn is_fight_end(line: &str) -> bool {
    let lower = line.to_lowercase();
    FIGHT_END_PHRASES
        .iter()
        .any(|(tag, message)| lower.contains(tag) && lower.contains(message))
}

/// Text after the first `"] "`, or None for lines without a bracketed tag.
pub fn fight_content(line: &str) -> Option<&str> {
    line.split_once("] ").map(|(_, content)| content.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fight_tag_wins_over_loot_phrase() {
        assert_eq!(classify("12:00:00,000 - [Fight Log] Bob picked up 2x Wool"), LineKind::Fight);
        assert_eq!(classify("12:00:00,000 - [Game Log] You picked up 2x Wool."), LineKind::Loot);
        assert_eq!(classify("12:00:00,000 - [Guild] Alice : hi"), LineKind::Chat);
        assert_eq!(classify("You have earned 10 kamas"), LineKind::Other);
    }

    #[test]
    fn localized_fight_tags() {
        assert_eq!(classify("[Information (combat)] Alice lance Bond."), LineKind::Fight);
        assert_eq!(classify("[Registro de Lutas] Bob: -10 PV"), LineKind::Fight);
    }

    #[test]
    fn fight_end_needs_tag_and_phrase() {
        assert!(is_fight_end("[Fight Log] The fight is over."));
        assert!(is_fight_end("[Information (combat)] Le combat est terminé"));
        assert!(!is_fight_end("[Guild] Alice : the fight is over"));
        assert!(!is_fight_end("[Fight Log] Bob: -10 HP"));
    }

    #[test]
    fn content_is_everything_after_first_tag() {
        assert_eq!(fight_content("[Fight Log] Bob: -10 HP (Fire)"), Some("Bob: -10 HP (Fire)"));
        assert_eq!(fight_content("no tag here"), None);
    }
}

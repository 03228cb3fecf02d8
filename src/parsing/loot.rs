use crate::parsing::regex::RE_LOOT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootDrop {
    pub quantity: u64,
    pub item: String,
}

/// Matches `picked up <N>x <Item>` anywhere in the line.
pub fn parse_loot_line(line: &str) -> Option<LootDrop> {
    let caps = RE_LOOT.captures(line)?;
    let quantity = caps["quantity"].parse().ok()?;
    let item = caps["item"].replace('\u{00A0}', " ").trim().to_string();
    if item.is_empty() {
        return None;
    }
    Some(LootDrop { quantity, item })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quantity_and_item() {
        let drop = parse_loot_line("12:00:00,000 - [Game Log] You picked up 92x Gobball Wool.").unwrap();
        assert_eq!(drop, LootDrop { quantity: 92, item: "Gobball Wool".into() });
    }

    #[test]
    fn rejects_other_lines() {
        assert!(parse_loot_line("You picked up nothing").is_none());
        assert!(parse_loot_line("Bob: -10 HP").is_none());
    }
}

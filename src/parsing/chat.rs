use chrono::NaiveTime;
use regex::{Captures, Regex};
use crate::models::chat::{ChatCategory, ChatMessage, Highlight, Span};
use crate::models::combat::Element;
use crate::parsing::locale::{
    contains_any, CHANNEL_KEYWORDS, FIGHT_CHANNEL_MARKERS, GAME_LOG_MARKER, LEVEL_WORDS, LOOT_PHRASES,
};
use crate::parsing::regex::{
    RE_CHAT_BRACKET, RE_ELEMENT_DAMAGE, RE_KAMA_AMOUNT, RE_LEVEL_NUMBER, RE_LOOT_NUMBER,
    RE_NEUTRAL_DAMAGE, RE_PARENTHESIS, RE_QUOTED, RE_RESISTANCE, RE_STANDALONE_ELEMENT, RE_WAIT,
};

const DEFAULT_CHANNEL: &str = "General";
const VICINITY_CHANNEL: &str = "Vicinity";

/// Parses `HH:MM:SS,mmm - [Channel] Author : Message` and its fallbacks.
pub fn parse_chat_line(line: &str) -> Option<ChatMessage> {
    let (stamp, rest) = line.split_once(" - ")?;
    let raw_time = stamp.split(',').next().unwrap_or(stamp);
    let time = format_display_time(raw_time);

    let mut channel = DEFAULT_CHANNEL.to_string();
    let mut author = String::new();
    let mut message = rest.to_string();

    if let Some(caps) = RE_CHAT_BRACKET.captures(rest) {
        channel = caps["channel"].to_string();
        let after = &caps["rest"];
        match after.split_once(" : ") {
            Some((who, text)) => {
                author = who.to_string();
                message = text.to_string();
            }
            None => message = after.to_string(),
        }
    } else if let Some((who, text)) = rest.split_once(" : ") {
        author = who.to_string();
        message = text.to_string();
        channel = VICINITY_CHANNEL.to_string();
    }

    let category = category_from_channel(&channel);
    let spans = markup_message(&channel, &message);
    let cooldown_seconds = RE_WAIT
        .captures(&message)
        .and_then(|caps| caps["seconds"].parse().ok());

    Some(ChatMessage {
        time,
        channel,
        author,
        message,
        category,
        spans,
        cooldown_seconds,
    })
}

/// `HH:MM:SS` to `HH:MM`; unparseable stamps are shown as-is.
pub fn format_display_time(raw: &str) -> String {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S")
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| raw.trim().to_string())
}

pub fn category_from_channel(channel: &str) -> ChatCategory {
    let lower = channel.to_lowercase();
    CHANNEL_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(category, _)| *category)
        .unwrap_or(ChatCategory::Other)
}

pub fn markup_message(channel: &str, message: &str) -> Vec<Span> {
    let lower = channel.to_lowercase();
    if lower.contains(GAME_LOG_MARKER) {
        markup_game_log(message)
    } else if contains_any(&lower, FIGHT_CHANNEL_MARKERS) {
        markup_fight_log(message)
    } else {
        vec![Span::plain(message)]
    }
}

/// Splits every plain span around the matches of `re`, replacing each match
/// with the spans `render` builds. Already highlighted spans are left alone.
/// Returns whether anything matched.
fn apply_rule<F>(spans: &mut Vec<Span>, re: &Regex, render: F) -> bool
where
    F: Fn(&Captures) -> Vec<Span>,
{
    let mut matched = false;
    let mut out = Vec::with_capacity(spans.len());
    for span in spans.drain(..) {
        if span.highlight != Highlight::Plain {
            out.push(span);
            continue;
        }
        let mut last = 0;
        for caps in re.captures_iter(&span.text) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                out.push(Span::plain(&span.text[last..whole.start()]));
            }
            out.extend(render(&caps));
            last = whole.end();
            matched = true;
        }
        if last < span.text.len() {
            out.push(Span::plain(&span.text[last..]));
        }
    }
    *spans = merge_plain(out);
    matched
}

fn merge_plain(spans: Vec<Span>) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        if span.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(prev) if prev.highlight == Highlight::Plain && span.highlight == Highlight::Plain => {
                prev.text.push_str(&span.text);
            }
            _ => merged.push(span),
        }
    }
    merged
}

fn markup_game_log(message: &str) -> Vec<Span> {
    let mut spans = vec![Span::plain(message)];

    let is_kama = apply_rule(&mut spans, &RE_KAMA_AMOUNT, |caps| {
        vec![
            Span::new(&caps["number"], Highlight::Kamas),
            Span::plain(&caps["gap"]),
            Span::new(&caps["unit"], Highlight::Kamas),
        ]
    });

    if !is_kama && contains_any(&message.to_lowercase(), LOOT_PHRASES) {
        apply_rule(&mut spans, &RE_LOOT_NUMBER, |caps| vec![Span::new(&caps[0], Highlight::Number)]);
    }

    apply_rule(&mut spans, &RE_QUOTED, |caps| {
        vec![
            Span::plain("\""),
            Span::new(&caps["inner"], Highlight::Bold),
            Span::plain("\""),
        ]
    });
    spans
}

fn markup_fight_log(message: &str) -> Vec<Span> {
    let mut spans = vec![Span::plain(message)];

    apply_rule(&mut spans, &RE_RESISTANCE, |caps| {
        let raw = &caps["number"];
        let lead = raw.len() - raw.trim_start().len();
        let mut number = raw.trim().to_string();
        let positive = number.chars().any(|c| c.is_ascii_digit() && c != '0');
        if positive && !number.starts_with(['+', '-']) {
            number.insert(0, '+');
        }
        vec![
            Span::plain(&raw[..lead]),
            Span::new(number, Highlight::Resistance),
            Span::plain(&caps["label"]),
        ]
    });

    for (element, re) in RE_ELEMENT_DAMAGE.iter() {
        apply_rule(&mut spans, re, |caps| {
            vec![
                Span::new(format!("{} {}", &caps["amount"], &caps["unit"]), Highlight::Element(*element)),
                Span::plain(" "),
                Span::new(format!("({})", &caps["element"]), Highlight::Element(*element)),
            ]
        });
    }

    apply_rule(&mut spans, &RE_NEUTRAL_DAMAGE, |caps| {
        vec![Span::new(
            format!("{} {}", &caps["amount"], &caps["unit"]),
            Highlight::Element(Element::Neutral),
        )]
    });

    for (element, re) in RE_STANDALONE_ELEMENT.iter() {
        apply_rule(&mut spans, re, |caps| {
            vec![Span::new(format!("({})", &caps["element"]), Highlight::Element(*element))]
        });
    }

    if contains_any(&message.to_lowercase(), LEVEL_WORDS) {
        apply_rule(&mut spans, &RE_LEVEL_NUMBER, |caps| vec![Span::new(&caps[0], Highlight::Level)]);
    }

    apply_rule(&mut spans, &RE_PARENTHESIS, |caps| {
        vec![
            Span::plain("("),
            Span::new(&caps["inner"], Highlight::Bold),
            Span::plain(")"),
        ]
    });
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlighted(spans: &[Span]) -> Vec<(&str, Highlight)> {
        spans
            .iter()
            .filter(|s| s.highlight != Highlight::Plain)
            .map(|s| (s.text.as_str(), s.highlight))
            .collect()
    }

    #[test]
    fn bracketed_line_with_author() {
        let msg = parse_chat_line("16:49:04,123 - [Guild] Alice : see you - later").unwrap();
        assert_eq!(msg.time, "16:49");
        assert_eq!(msg.channel, "Guild");
        assert_eq!(msg.author, "Alice");
        assert_eq!(msg.message, "see you - later");
        assert_eq!(msg.category, ChatCategory::Guild);
    }

    #[test]
    fn fallbacks_to_vicinity_and_general() {
        let msg = parse_chat_line("10:00:00,000 - Bob : hello").unwrap();
        assert_eq!(msg.channel, "Vicinity");
        assert_eq!(msg.author, "Bob");

        let msg = parse_chat_line("10:00:00,000 - Server restart soon").unwrap();
        assert_eq!(msg.channel, "General");
        assert_eq!(msg.author, "");
        assert_eq!(msg.category, ChatCategory::Other);

        assert!(parse_chat_line("no separator").is_none());
    }

    #[test]
    fn logs_category_wins() {
        assert_eq!(category_from_channel("Fight Log"), ChatCategory::Logs);
        assert_eq!(category_from_channel("Information (combat)"), ChatCategory::Logs);
        assert_eq!(category_from_channel("Proximité"), ChatCategory::Vicinity);
        assert_eq!(category_from_channel("Privé"), ChatCategory::Private);
        assert_eq!(category_from_channel("Recrutement"), ChatCategory::Recruitment);
        assert_eq!(category_from_channel("JcJ"), ChatCategory::Pvp);
        assert_eq!(category_from_channel("Politics"), ChatCategory::Politics);
        assert_eq!(category_from_channel("Zzz"), ChatCategory::Other);
    }

    #[test]
    fn wait_message_sets_cooldown() {
        let msg = parse_chat_line("10:00:00,000 - [Error] You must wait 87 seconds before posting").unwrap();
        assert_eq!(msg.cooldown_seconds, Some(87));
    }

    #[test]
    fn game_log_kamas_markup() {
        let spans = markup_message("Game Log", "You have earned 1 234 kamas.");
        assert_eq!(
            highlighted(&spans),
            vec![("1 234", Highlight::Kamas), ("kamas", Highlight::Kamas)]
        );
    }

    #[test]
    fn game_log_loot_and_quotes() {
        let spans = markup_message("Game Log", "You picked up 3x \"Gobball Wool\".");
        assert_eq!(
            highlighted(&spans),
            vec![("3x", Highlight::Number), ("Gobball Wool", Highlight::Bold)]
        );
    }

    #[test]
    fn fight_log_element_markup() {
        let spans = markup_message("Fight Log", "Bob: -1,500 HP (Feu) (Critical)");
        assert_eq!(
            highlighted(&spans),
            vec![
                ("-1,500 HP", Highlight::Element(Element::Fire)),
                ("(Feu)", Highlight::Element(Element::Fire)),
                ("Critical", Highlight::Bold),
            ]
        );
        let text: String = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(text, "Bob: -1,500 HP (Feu) (Critical)");
    }

    #[test]
    fn fight_log_neutral_and_resistance() {
        let spans = markup_message("Fight Log", "Bob: -40 HP");
        assert_eq!(highlighted(&spans), vec![("-40 HP", Highlight::Element(Element::Neutral))]);

        let spans = markup_message("Fight Log", "Bob: 20 Elemental Resistance");
        assert_eq!(highlighted(&spans), vec![("+20", Highlight::Resistance)]);
    }

    #[test]
    fn level_numbers_only_on_level_lines() {
        let spans = markup_message("Information", "Alice reaches level 150");
        assert_eq!(highlighted(&spans), vec![("150", Highlight::Level)]);

        let spans = markup_message("Information", "Alice has 150 friends");
        assert!(highlighted(&spans).is_empty());
    }

    #[test]
    fn other_channels_are_plain() {
        let spans = markup_message("Trade", "selling 10x wool for 500 kamas");
        assert_eq!(spans, vec![Span::plain("selling 10x wool for 500 kamas")]);
    }
}

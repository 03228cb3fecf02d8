use crate::models::session::{SessionEvent, SessionStats, COMBAT_CATEGORY, PROFESSIONS};
use crate::parsing::locale::{contains_any, KAMA_SPENT_MARKERS};
use crate::parsing::regex::{parse_grouped_number, RE_CHALLENGE, RE_KAMAS, RE_QUEST, RE_XP};

/// Extracts every progress delta a line carries. Independent of line
/// classification; lines with nothing to report yield an empty list.
pub fn parse_session_line(line: &str) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    if line.trim().is_empty() {
        return events;
    }
    let lower = line.to_lowercase();

    if let Some(amount) = RE_KAMAS
        .captures(line)
        .and_then(|caps| parse_grouped_number(&caps["amount"]))
    {
        if contains_any(&lower, KAMA_SPENT_MARKERS) {
            events.push(SessionEvent::KamasSpent(amount));
        } else {
            events.push(SessionEvent::KamasEarned(amount));
        }
    }

    if let Some(amount) = RE_XP
        .captures(line)
        .and_then(|caps| parse_grouped_number(&caps["amount"]))
    {
        events.push(SessionEvent::Xp {
            category: xp_category(&lower).to_string(),
            amount,
        });
    }

    if RE_QUEST.is_match(line) {
        events.push(SessionEvent::QuestCompleted);
    }
    if RE_CHALLENGE.is_match(line) {
        events.push(SessionEvent::ChallengeCompleted);
    }
    events
}

/// First profession written as `<Profession>:`, else combat XP.
fn xp_category(lower: &str) -> &'static str {
    PROFESSIONS
        .iter()
        .find(|profession| lower.contains(&format!("{}:", profession.to_lowercase())))
        .copied()
        .unwrap_or(COMBAT_CATEGORY)
}

/// Optional collaborator that receives every non-duplicate line.
pub trait ProgressTracker {
    /// Returns true when the tally changed.
    fn observe(&mut self, line: &str, now_ms: i64) -> bool;

    fn stats(&self) -> Option<&SessionStats> {
        None
    }

    fn reset(&mut self, _now_ms: i64) {}
}

/// Tracker that ignores everything.
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressTracker for NoProgress {
    fn observe(&mut self, _line: &str, _now_ms: i64) -> bool {
        false
    }
}

/// Running kamas/XP/quest/challenge tally for the play session.
#[derive(Debug, Default)]
pub struct SessionRecap {
    stats: SessionStats,
}

impl SessionRecap {
    pub fn new(stats: SessionStats) -> Self {
        Self { stats }
    }
}

impl ProgressTracker for SessionRecap {
    fn observe(&mut self, line: &str, now_ms: i64) -> bool {
        let events = parse_session_line(line);
        if events.is_empty() {
            return false;
        }
        for event in &events {
            self.stats.apply(event);
        }
        if self.stats.started_at_ms.is_none() {
            self.stats.started_at_ms = Some(now_ms);
        }
        true
    }

    fn stats(&self) -> Option<&SessionStats> {
        Some(&self.stats)
    }

    fn reset(&mut self, now_ms: i64) {
        self.stats.reset(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kamas_direction_follows_verb() {
        assert_eq!(
            parse_session_line("You have earned 1 500 kamas."),
            vec![SessionEvent::KamasEarned(1500)]
        );
        assert_eq!(
            parse_session_line("Vous avez perdu 2.000 kamas"),
            vec![SessionEvent::KamasSpent(2000)]
        );
        assert_eq!(
            parse_session_line("You spent 30\u{00A0}000 kamas"),
            vec![SessionEvent::KamasSpent(30000)]
        );
    }

    #[test]
    fn xp_goes_to_profession_or_combat() {
        assert_eq!(
            parse_session_line("Miner: +120 XP"),
            vec![SessionEvent::Xp { category: "Miner".into(), amount: 120 }]
        );
        assert_eq!(
            parse_session_line("You have gained 5,432 XP points."),
            vec![SessionEvent::Xp { category: "Combat".into(), amount: 5432 }]
        );
    }

    #[test]
    fn quests_and_challenges() {
        assert_eq!(parse_session_line("Quest completed: The Gobball"), vec![SessionEvent::QuestCompleted]);
        assert_eq!(parse_session_line("Défi réussi !"), vec![SessionEvent::ChallengeCompleted]);
        assert!(parse_session_line("Alice : hello").is_empty());
    }

    #[test]
    fn recap_starts_clock_on_first_progress() {
        let mut recap = SessionRecap::default();
        assert!(!recap.observe("nothing here", 10));
        assert!(recap.stats().unwrap().started_at_ms.is_none());
        assert!(recap.observe("Quest completed", 20));
        assert!(recap.observe("Quest completed", 30));
        let stats = recap.stats().unwrap();
        assert_eq!(stats.quests, 2);
        assert_eq!(stats.started_at_ms, Some(20));
    }

    #[test]
    fn no_progress_reports_nothing() {
        let mut tracker = NoProgress;
        assert!(!tracker.observe("Quest completed", 0));
        assert!(tracker.stats().is_none());
    }
}

use std::collections::{HashSet, VecDeque};
use crate::models::{
    ActorAggregate, Allegiance, AppSettings, AttributionState, ChatMessage, CombatStores, FightHistory,
    FightSnapshot, ItemTracker, LiveFight, LootProgress, ReferenceData, Roster, SessionStats, StoreKind,
};
use crate::models::combat::FightClock;
use crate::models::roster::resolve_ally;
use crate::parsing::chat::parse_chat_line;
use crate::parsing::classifier::{classify, fight_content, is_fight_end, LineKind};
use crate::parsing::combat::{process_fight_content, CombatContext, CombatOutcome};
use crate::parsing::loot::parse_loot_line;
use crate::parsing::session::{NoProgress, ProgressTracker};
use crate::utils::persistence::{NoopPersistence, PersistenceSink};
use crate::utils::time::local_time_label;

/// How often the line cache and label cache are purged.
pub const MAINTENANCE_INTERVAL_MS: i64 = 5 * 60 * 1000;

/// Bounded FIFO set of recently seen raw lines.
#[derive(Debug, Clone)]
pub struct LineCache {
    seen: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl LineCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Records `line`; false when it was already present.
    pub fn insert(&mut self, line: &str) -> bool {
        if self.seen.contains(line) {
            return false;
        }
        self.seen.insert(line.to_string());
        self.order.push_back(line.to_string());
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Blank,
    Duplicate,
    Processed(LineKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeterView {
    #[default]
    Live,
    History(usize),
}

/// Actors of one channel split into the two display lists.
#[derive(Debug, Default)]
pub struct Bucketed<'a> {
    pub allies: Vec<&'a ActorAggregate>,
    pub enemies: Vec<&'a ActorAggregate>,
    pub total: u64,
}

/// Owns all engine state: the live fight, history, chat feed and
/// durable roster. Every line and user intent goes through here.
pub struct Meter {
    settings: AppSettings,
    reference: ReferenceData,
    state: AttributionState,
    stores: CombatStores,
    roster: Roster,
    clock: FightClock,
    history: FightHistory,
    chat: VecDeque<ChatMessage>,
    tracker: ItemTracker,
    progress: Box<dyn ProgressTracker>,
    persistence: Box<dyn PersistenceSink>,
    seen: LineCache,
    last_maintenance_ms: Option<i64>,
    cooldown_until_ms: Option<i64>,
    loot_events: Vec<LootProgress>,
}

impl Meter {
    pub fn new(settings: AppSettings, reference: ReferenceData) -> Self {
        let seen = LineCache::new(settings.dedup_capacity);
        let history = FightHistory::with_capacity(settings.history_capacity);
        Self {
            settings,
            reference,
            state: AttributionState::default(),
            stores: CombatStores::new(),
            roster: Roster::new(),
            clock: FightClock::default(),
            history,
            chat: VecDeque::new(),
            tracker: ItemTracker::new(),
            progress: Box::new(NoProgress),
            persistence: Box::new(NoopPersistence),
            seen,
            last_maintenance_ms: None,
            cooldown_until_ms: None,
            loot_events: Vec::new(),
        }
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressTracker>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_persistence(mut self, persistence: Box<dyn PersistenceSink>) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_history(mut self, snapshots: Vec<FightSnapshot>) -> Self {
        self.history = FightHistory::from_entries(snapshots, self.settings.history_capacity);
        self
    }

    pub fn with_tracker(mut self, tracker: ItemTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Picks up a fight that was in progress when the app last closed.
    pub fn with_live(mut self, live: LiveFight) -> Self {
        self.stores = live.stores;
        self.stores.dirty = live.unsaved;
        self.clock = live.clock;
        self.state.awaiting_new_fight = live.awaiting_new_fight;
        self
    }

    pub fn process_lines<I, S>(&mut self, lines: I, now_ms: i64) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .filter(|line| matches!(self.process_line(line.as_ref(), now_ms), LineOutcome::Processed(_)))
            .count()
    }

    pub fn process_line(&mut self, line: &str, now_ms: i64) -> LineOutcome {
        if line.trim().is_empty() {
            return LineOutcome::Blank;
        }

        // Runs before deduplication; a repeated end line is gated by the dirty flag.
        let fight_end = is_fight_end(line);
        if fight_end {
            self.save_fight_to_history(now_ms);
            self.state.awaiting_new_fight = true;
            tracing::info!("fight ended");
        }

        if !self.seen.insert(line) {
            return LineOutcome::Duplicate;
        }

        let kind = classify(line);
        match kind {
            LineKind::Fight => {
                self.process_fight_line(line, fight_end, now_ms);
                self.mirror_fight_line(line);
            }
            LineKind::Chat => self.process_chat_line(line, now_ms),
            LineKind::Loot | LineKind::Other => {}
        }

        self.process_loot_line(line);
        if self.progress.observe(line, now_ms) {
            if let Some(stats) = self.progress.stats() {
                if let Err(e) = self.persistence.save_session(stats) {
                    tracing::warn!(error = %e, "failed to save session stats");
                }
            }
        }
        LineOutcome::Processed(kind)
    }

    fn process_fight_line(&mut self, line: &str, fight_end: bool, now_ms: i64) {
        let Some(content) = fight_content(line) else {
            return;
        };

        if self.settings.auto_reset && self.state.awaiting_new_fight && !fight_end {
            tracing::info!("new fight detected, auto-resetting meter");
            self.reset(now_ms);
        }

        let mut ctx = CombatContext {
            state: &mut self.state,
            stores: &mut self.stores,
            roster: &mut self.roster,
            clock: &mut self.clock,
            reference: &self.reference,
            now_ms,
        };
        let outcome = process_fight_content(content, &mut ctx);
        if let CombatOutcome::Cast { class_detected: true, .. } = outcome {
            self.save_roster();
        }
    }

    fn process_chat_line(&mut self, line: &str, now_ms: i64) {
        let Some(message) = parse_chat_line(line) else {
            return;
        };
        if let Some(seconds) = message.cooldown_seconds {
            self.cooldown_until_ms = Some(now_ms + i64::from(seconds) * 1000);
        }
        self.push_chat(message);
    }

    /// Fight lines show up in the feed with their damage markup only.
    fn mirror_fight_line(&mut self, line: &str) {
        if let Some(mut message) = parse_chat_line(line) {
            message.cooldown_seconds = None;
            self.push_chat(message);
        }
    }

    fn push_chat(&mut self, message: ChatMessage) {
        self.chat.push_back(message);
        while self.chat.len() > self.settings.chat_history {
            self.chat.pop_front();
        }
    }

    fn process_loot_line(&mut self, line: &str) {
        let Some(drop) = parse_loot_line(line) else {
            return;
        };
        let progress = self.tracker.record(&drop.item, drop.quantity);
        if progress.is_empty() {
            return;
        }
        for p in &progress {
            if p.goal_reached {
                tracing::info!(item = %p.item, target = p.target, "tracking goal reached");
            }
        }
        self.loot_events.extend(progress);
        if let Err(e) = self.persistence.save_tracker(&self.tracker) {
            tracing::warn!(error = %e, "failed to save tracked items");
        }
    }

    /// Freezes the live stores into history. Skipped when nothing changed
    /// since the last snapshot or every store is empty.
    pub fn save_fight_to_history(&mut self, now_ms: i64) -> bool {
        if !self.stores.dirty || self.stores.is_empty() {
            return false;
        }
        let snapshot = FightSnapshot::capture(&self.stores, &self.roster, local_time_label(now_ms));
        self.history.push(snapshot);
        if let Err(e) = self.persistence.save_history(&self.history.to_vec()) {
            tracing::error!(error = %e, "failed to persist fight history, clearing it");
            self.history.clear();
        }
        self.stores.dirty = false;
        tracing::debug!(entries = self.history.len(), "fight saved to history");
        true
    }

    /// Snapshots, then clears the live fight. Classes, overrides and
    /// summon bindings survive.
    pub fn reset(&mut self, now_ms: i64) {
        self.save_fight_to_history(now_ms);
        self.stores.clear();
        self.state = AttributionState::default();
        self.clock.clear();
    }

    /// Manual ally/enemy assignment; `None` removes the override.
    pub fn set_override(&mut self, actor: &str, allegiance: Option<Allegiance>) {
        match allegiance {
            Some(a) => self.roster.set_override(actor, a),
            None => self.roster.clear_override(actor),
        }
        self.save_roster();
    }

    /// Binds `summon` to `master` and folds the summon's live totals into
    /// the master. Returns false for a self-binding.
    pub fn bind_summon(&mut self, summon: &str, master: &str) -> bool {
        if summon == master {
            return false;
        }
        self.roster.bind_summon(summon, master);
        // Merging is not a fold and leaves the dirty flag alone.
        self.stores.merge_summon(summon, master);
        self.save_roster();
        true
    }

    pub fn set_auto_reset(&mut self, enabled: bool) {
        self.settings.auto_reset = enabled;
        if let Err(e) = self.persistence.save_settings(&self.settings) {
            tracing::warn!(error = %e, "failed to save settings");
        }
    }

    pub fn track_item(&mut self, name: &str, target: u64) {
        self.tracker.track(name, target);
        self.save_tracker();
    }

    pub fn set_item_price(&mut self, name: &str, price: u64) {
        self.tracker.set_price(name, price);
        self.save_tracker();
    }

    pub fn untrack_item(&mut self, name: &str) {
        if self.tracker.untrack(name) {
            self.save_tracker();
        }
    }

    pub fn reset_session(&mut self, now_ms: i64) {
        self.progress.reset(now_ms);
        if let Some(stats) = self.progress.stats() {
            if let Err(e) = self.persistence.save_session(stats) {
                tracing::warn!(error = %e, "failed to save session stats");
            }
        }
    }

    pub fn live_fight(&self) -> LiveFight {
        LiveFight {
            stores: self.stores.clone(),
            clock: self.clock,
            awaiting_new_fight: self.state.awaiting_new_fight,
            unsaved: self.stores.dirty,
        }
    }

    /// Writes the fight in progress so the next start can resume it.
    pub fn save_live(&mut self) {
        let live = self.live_fight();
        match self.persistence.save_live(&live) {
            Ok(()) => tracing::info!(actors = live.stores.damage.len(), "saved live fight"),
            Err(e) => tracing::warn!(error = %e, "failed to save live fight"),
        }
    }

    /// Periodic purge of the dedup and label caches.
    pub fn maintain(&mut self, now_ms: i64) -> bool {
        let Some(last) = self.last_maintenance_ms else {
            self.last_maintenance_ms = Some(now_ms);
            return false;
        };
        if now_ms - last < MAINTENANCE_INTERVAL_MS {
            return false;
        }
        tracing::debug!(cached_lines = self.seen.len(), "running maintenance");
        self.seen.clear();
        self.roster.clear_label_cache();
        self.last_maintenance_ms = Some(now_ms);
        true
    }

    /// Forget tracking-session state when a (new) log file is selected.
    pub fn start_tracking(&mut self, now_ms: i64) {
        self.reset(now_ms);
        self.chat.clear();
        self.seen.clear();
    }

    fn save_roster(&mut self) {
        if let Err(e) = self.persistence.save_roster(&self.roster) {
            tracing::warn!(error = %e, "failed to save roster");
        }
    }

    fn save_tracker(&mut self) {
        if let Err(e) = self.persistence.save_tracker(&self.tracker) {
            tracing::warn!(error = %e, "failed to save tracked items");
        }
    }

    pub fn bucketed(&self, kind: StoreKind, view: MeterView) -> Option<Bucketed<'_>> {
        // History views bucket with the maps frozen in their snapshot.
        let (store, classes, overrides) = match view {
            MeterView::Live => (self.stores.store(kind), &self.roster.classes, &self.roster.overrides),
            MeterView::History(index) => {
                let snapshot = self.history.get(index)?;
                (snapshot.store(kind), &snapshot.classes, &snapshot.overrides)
            }
        };
        let mut out = Bucketed { total: store.grand_total(), ..Bucketed::default() };
        for actor in store.sorted_by_total() {
            if resolve_ally(&actor.name, classes, overrides, &self.reference) {
                out.allies.push(actor);
            } else {
                out.enemies.push(actor);
            }
        }
        Some(out)
    }

    pub fn display_label(&mut self, actor: &str) -> String {
        self.roster.display_label(actor)
    }

    pub fn drain_loot_events(&mut self) -> Vec<LootProgress> {
        std::mem::take(&mut self.loot_events)
    }

    pub fn cooldown_remaining_secs(&self, now_ms: i64) -> Option<i64> {
        self.cooldown_until_ms
            .map(|until| (until - now_ms + 999) / 1000)
            .filter(|secs| *secs > 0)
    }

    pub fn fight_duration(&self, now_ms: i64) -> String {
        self.clock.duration_label(now_ms)
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn state(&self) -> &AttributionState {
        &self.state
    }

    pub fn stores(&self) -> &CombatStores {
        &self.stores
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn history(&self) -> &FightHistory {
        &self.history
    }

    pub fn chat(&self) -> impl Iterator<Item = &ChatMessage> {
        self.chat.iter()
    }

    pub fn tracker(&self) -> &ItemTracker {
        &self.tracker
    }

    pub fn session_stats(&self) -> Option<&SessionStats> {
        self.progress.stats()
    }

    pub fn awaiting_new_fight(&self) -> bool {
        self.state.awaiting_new_fight
    }

    pub fn last_activity_ms(&self) -> Option<i64> {
        self.clock.last_activity_ms
    }
}

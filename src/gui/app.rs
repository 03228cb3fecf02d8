use std::path::PathBuf;
use std::time::{Duration, Instant};
use crate::gui::chat_window::ChatWindowState;
use crate::gui::helpers::compute_store_hash;
use crate::gui::session_window::SessionWindowState;
use crate::log::{FileLogSource, TailDriver, TickOutcome};
use crate::models::{Allegiance, Element, StoreKind};
use crate::parsing::{Meter, MeterView};
use crate::utils::time::now_ms;

/// How long to wait between attempts to open a log file that is not there yet.
const TRACK_RETRY: Duration = Duration::from_secs(5);

/// One bar of the meter, detached from the engine so it can be drawn while
/// user intents mutate the meter.
#[derive(Debug, Clone)]
pub struct BarRow {
    pub name: String,
    pub label: String,
    pub total: u64,
    pub abilities: Vec<(String, Option<Element>, u64)>,
}

/// User actions collected during a frame and applied afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SetOverride { actor: String, allegiance: Option<Allegiance> },
    BindSummon { summon: String, master: String },
    Reset,
    SetAutoReset(bool),
    Reconnect,
    TrackItem { name: String, target: u64 },
    SetPrice { name: String, price: u64 },
    UntrackItem(String),
    ResetSession,
}

pub struct MeterApp {
    pub meter: Meter,
    pub driver: TailDriver<FileLogSource>,
    pub log_path: PathBuf,
    /// False until the log file has been opened once.
    pub tracking: bool,
    /// Set after the first successful track; later tracks start a clean fight.
    tracked_before: bool,
    last_track_attempt: Option<Instant>,
    pub store_kind: StoreKind,
    pub view: MeterView,
    pub text_scale: f32,
    /// Cached rows, rebuilt only when the render hash changes
    pub ally_rows: Vec<BarRow>,
    pub enemy_rows: Vec<BarRow>,
    pub rows_total: u64,
    last_rows_hash: Option<u64>,
    pub chat_state: ChatWindowState,
    pub chat_window_open: bool,
    pub session_state: SessionWindowState,
    pub session_window_open: bool,
    /// Last notable event shown under the header
    pub status: Option<String>,
    pub pending_intents: Vec<Intent>,
}

impl MeterApp {
    pub fn new(meter: Meter, log_path: PathBuf) -> Self {
        let driver = TailDriver::new(FileLogSource::new(&log_path), meter.settings());
        let mut app = Self {
            meter,
            driver,
            log_path,
            tracking: false,
            tracked_before: false,
            last_track_attempt: None,
            store_kind: StoreKind::Damage,
            view: MeterView::Live,
            text_scale: 1.0,
            ally_rows: Vec::new(),
            enemy_rows: Vec::new(),
            rows_total: 0,
            last_rows_hash: None,
            chat_state: ChatWindowState::default(),
            chat_window_open: false,
            session_state: SessionWindowState::default(),
            session_window_open: false,
            status: None,
            pending_intents: Vec::new(),
        };
        app.try_track(Instant::now());
        app
    }

    fn try_track(&mut self, now: Instant) {
        self.last_track_attempt = Some(now);
        match self.driver.track() {
            Ok(_) => {
                self.tracking = true;
                // The first track keeps the fight restored from disk
                if self.tracked_before {
                    self.meter.start_tracking(now_ms());
                }
                self.tracked_before = true;
                self.status = Some(format!("Tracking {}", self.log_path.display()));
            }
            Err(e) => {
                tracing::warn!(path = %self.log_path.display(), error = %e, "log file not available yet");
                self.status = Some(format!("Waiting for {}", self.log_path.display()));
            }
        }
    }

    /// Called once per frame: polls the log when due, feeds new lines to
    /// the meter and runs periodic maintenance.
    pub fn pump(&mut self, now: Instant) {
        if !self.tracking {
            let retry_due = self
                .last_track_attempt
                .is_none_or(|last| now.saturating_duration_since(last) >= TRACK_RETRY);
            if retry_due {
                self.try_track(now);
            }
            return;
        }

        if self.driver.is_due(now) {
            let wall_ms = now_ms();
            match self.driver.tick(now) {
                TickOutcome::Read { lines } => {
                    let processed = self.meter.process_lines(&lines, wall_ms);
                    tracing::debug!(read = lines.len(), processed, "processed new log lines");
                }
                TickOutcome::Failed { strikes } => {
                    self.status = Some(format!("Log unreachable ({} strikes)", strikes));
                }
                TickOutcome::Stopped => {
                    self.status = Some("Lost the log file. Reconnect to resume.".to_string());
                }
                TickOutcome::Idle | TickOutcome::Skipped | TickOutcome::Busy => {}
            }
            self.meter.maintain(wall_ms);
        }

        for event in self.meter.drain_loot_events() {
            self.status = Some(if event.goal_reached {
                format!("Goal reached: {} {}/{}", event.item, event.current, event.target)
            } else {
                format!("+{} {} ({}/{})", event.added, event.item, event.current, event.target)
            });
        }
    }

    pub fn apply_intents(&mut self) {
        let now = now_ms();
        for intent in std::mem::take(&mut self.pending_intents) {
            match intent {
                Intent::SetOverride { actor, allegiance } => self.meter.set_override(&actor, allegiance),
                Intent::BindSummon { summon, master } => {
                    if self.meter.bind_summon(&summon, &master) {
                        self.status = Some(format!("{} now counts for {}", summon, master));
                    }
                }
                Intent::Reset => {
                    self.meter.reset(now);
                    self.view = MeterView::Live;
                }
                Intent::SetAutoReset(enabled) => self.meter.set_auto_reset(enabled),
                Intent::Reconnect => match self.driver.reconnect() {
                    Ok(_) => {
                        self.tracking = true;
                        self.meter.start_tracking(now);
                        self.status = Some(format!("Tracking {}", self.log_path.display()));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "reconnect failed");
                        self.status = Some(format!("Reconnect failed: {}", e));
                    }
                },
                Intent::TrackItem { name, target } => self.meter.track_item(&name, target),
                Intent::SetPrice { name, price } => self.meter.set_item_price(&name, price),
                Intent::UntrackItem(name) => self.meter.untrack_item(&name),
                Intent::ResetSession => self.meter.reset_session(now),
            }
        }
    }

    /// Rebuilds the ally/enemy bar lists when the shown store changed.
    pub fn refresh_rows(&mut self) {
        if let MeterView::History(index) = self.view {
            if index >= self.meter.history().len() {
                self.view = MeterView::Live;
            }
        }

        let view_salt = match self.view {
            MeterView::Live => 0,
            MeterView::History(index) => index as u64 + 1,
        };
        let salt = view_salt * 4 + self.store_kind as u64;
        let store = match self.view {
            MeterView::Live => self.meter.stores().store(self.store_kind),
            MeterView::History(index) => match self.meter.history().get(index) {
                Some(snapshot) => snapshot.store(self.store_kind),
                None => return,
            },
        };
        let hash = compute_store_hash(store, self.meter.roster(), salt);
        if self.last_rows_hash == Some(hash) {
            return;
        }

        let Some(bucketed) = self.meter.bucketed(self.store_kind, self.view) else {
            return;
        };
        let detach = |actors: &[&crate::models::ActorAggregate]| -> Vec<BarRow> {
            actors
                .iter()
                .map(|actor| BarRow {
                    name: actor.name.clone(),
                    label: String::new(),
                    total: actor.total,
                    abilities: actor
                        .sorted_abilities()
                        .into_iter()
                        .map(|a| (a.display_name.clone(), a.element, a.value))
                        .collect(),
                })
                .collect()
        };
        let mut allies = detach(&bucketed.allies);
        let mut enemies = detach(&bucketed.enemies);
        let total = bucketed.total;

        for row in allies.iter_mut().chain(enemies.iter_mut()) {
            row.label = self.meter.display_label(&row.name);
        }

        self.ally_rows = allies;
        self.enemy_rows = enemies;
        self.rows_total = total;
        self.last_rows_hash = Some(hash);
    }

    pub fn select_view(&mut self, view: MeterView) {
        if self.view != view {
            self.view = view;
            self.last_rows_hash = None;
        }
    }

    pub fn select_store(&mut self, kind: StoreKind) {
        if self.store_kind != kind {
            self.store_kind = kind;
            self.last_rows_hash = None;
        }
    }

    /// Plain-text copy of the shown bars, one actor per line.
    pub fn format_rows_for_copy(&self) -> String {
        let mut lines = vec![format!(" {} ", self.store_kind.label())];
        let width = self
            .ally_rows
            .iter()
            .chain(self.enemy_rows.iter())
            .map(|row| row.total.to_string().len())
            .max()
            .unwrap_or(0)
            .max(4);

        for row in self.ally_rows.iter().chain(self.enemy_rows.iter()) {
            let percentage = if self.rows_total > 0 {
                (row.total as f64 / self.rows_total as f64 * 100.0).round() as u64
            } else {
                0
            };
            lines.push(format!("{:<20} {:>width$} ({}%)", row.label, row.total, percentage, width = width));
        }
        lines.join("\n")
    }
}

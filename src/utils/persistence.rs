use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use serde::de::DeserializeOwned;
use serde::Serialize;
use crate::error::PersistError;
use crate::models::{
    AppSettings, FightSnapshot, ItemTracker, LiveFight, ReferenceData, ReferenceFile, Roster, SessionStats,
};

pub const HISTORY_FILE: &str = "fight_history.json";
pub const ROSTER_FILE: &str = "roster.json";
pub const SESSION_FILE: &str = "session.json";
pub const TRACKER_FILE: &str = "tracked_items.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const REFERENCE_FILE: &str = "reference.json";
pub const LIVE_FILE: &str = "live_fight.json";

/// Write-behind storage for state that should survive a restart.
pub trait PersistenceSink {
    fn save_history(&mut self, history: &[FightSnapshot]) -> Result<(), PersistError>;
    fn save_roster(&mut self, roster: &Roster) -> Result<(), PersistError>;
    fn save_session(&mut self, stats: &SessionStats) -> Result<(), PersistError>;
    fn save_tracker(&mut self, tracker: &ItemTracker) -> Result<(), PersistError>;
    fn save_settings(&mut self, settings: &AppSettings) -> Result<(), PersistError>;
    fn save_live(&mut self, live: &LiveFight) -> Result<(), PersistError>;
}

/// Keeps nothing.
#[derive(Debug, Default)]
pub struct NoopPersistence;

impl PersistenceSink for NoopPersistence {
    fn save_history(&mut self, _history: &[FightSnapshot]) -> Result<(), PersistError> {
        Ok(())
    }

    fn save_roster(&mut self, _roster: &Roster) -> Result<(), PersistError> {
        Ok(())
    }

    fn save_session(&mut self, _stats: &SessionStats) -> Result<(), PersistError> {
        Ok(())
    }

    fn save_tracker(&mut self, _tracker: &ItemTracker) -> Result<(), PersistError> {
        Ok(())
    }

    fn save_settings(&mut self, _settings: &AppSettings) -> Result<(), PersistError> {
        Ok(())
    }

    fn save_live(&mut self, _live: &LiveFight) -> Result<(), PersistError> {
        Ok(())
    }
}

/// Pretty-printed JSON files in one directory.
#[derive(Debug, Clone)]
pub struct JsonPersistence {
    dir: PathBuf,
}

impl JsonPersistence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write<T: Serialize + ?Sized>(&self, file: &str, what: &'static str, value: &T) -> Result<(), PersistError> {
        let path = self.dir.join(file);
        let json = serde_json::to_string_pretty(value).map_err(|source| PersistError::Json { what, source })?;
        let io_err = |source| PersistError::Io { path: path.clone(), source };

        if !self.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.dir).map_err(io_err)?;
        }
        let mut out = fs::File::create(&path).map_err(io_err)?;
        out.write_all(json.as_bytes()).map_err(io_err)?;
        out.flush().map_err(io_err)?;
        tracing::debug!(path = %path.display(), "saved {}", what);
        Ok(())
    }

    pub fn load_history(&self) -> Vec<FightSnapshot> {
        load_json(&self.dir.join(HISTORY_FILE), "fight history")
    }

    pub fn load_roster(&self) -> Roster {
        load_json(&self.dir.join(ROSTER_FILE), "roster")
    }

    pub fn load_session(&self) -> SessionStats {
        SessionStats::merge_loaded(load_json(&self.dir.join(SESSION_FILE), "session stats"))
    }

    pub fn load_tracker(&self) -> ItemTracker {
        load_json(&self.dir.join(TRACKER_FILE), "tracked items")
    }

    pub fn load_settings(&self) -> AppSettings {
        load_json::<AppSettings>(&self.dir.join(SETTINGS_FILE), "settings").sanitized()
    }

    pub fn load_live(&self) -> LiveFight {
        load_json(&self.dir.join(LIVE_FILE), "live fight")
    }

    /// Game tables from `reference.json`, or the built-in seed.
    pub fn load_reference(&self) -> ReferenceData {
        let path = self.dir.join(REFERENCE_FILE);
        if !path.exists() {
            tracing::info!("no reference tables found, using built-in seed");
            return ReferenceData::builtin();
        }
        let file: ReferenceFile = load_json(&path, "reference tables");
        let data = ReferenceData::from_file(file);
        tracing::info!(abilities = data.ability_count(), "loaded reference tables");
        data
    }
}

impl PersistenceSink for JsonPersistence {
    fn save_history(&mut self, history: &[FightSnapshot]) -> Result<(), PersistError> {
        self.write(HISTORY_FILE, "fight history", history)
    }

    fn save_roster(&mut self, roster: &Roster) -> Result<(), PersistError> {
        self.write(ROSTER_FILE, "roster", roster)
    }

    fn save_session(&mut self, stats: &SessionStats) -> Result<(), PersistError> {
        self.write(SESSION_FILE, "session stats", stats)
    }

    fn save_tracker(&mut self, tracker: &ItemTracker) -> Result<(), PersistError> {
        self.write(TRACKER_FILE, "tracked items", tracker)
    }

    fn save_settings(&mut self, settings: &AppSettings) -> Result<(), PersistError> {
        self.write(SETTINGS_FILE, "settings", settings)
    }

    fn save_live(&mut self, live: &LiveFight) -> Result<(), PersistError> {
        self.write(LIVE_FILE, "live fight", live)
    }
}

/// Reads a JSON file, falling back to the default when it is missing or corrupt.
pub fn load_json<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no saved {} found, using defaults", what);
        return T::default();
    }
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<T>(&content) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt {}, using defaults", what);
                T::default()
            }
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read {}, using defaults", what);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::aggregate::CombatStores;

    #[test]
    fn history_round_trips_through_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonPersistence::new(dir.path());

        let mut stores = CombatStores::new();
        stores.damage.fold("Alice", "Fireball", 1500, Some(crate::models::Element::Fire));
        let snapshot = FightSnapshot::capture(&stores, &Roster::new(), "12:00:00".into());
        sink.save_history(&[snapshot.clone()]).unwrap();

        assert_eq!(sink.load_history(), vec![snapshot]);
    }

    #[test]
    fn corrupt_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        let sink = JsonPersistence::new(dir.path());
        assert_eq!(sink.load_settings(), AppSettings::default());
        assert!(sink.load_roster().classes.is_empty());
    }

    #[test]
    fn missing_reference_uses_builtin_seed() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonPersistence::new(dir.path());
        assert_eq!(sink.load_reference().class_of("Blackjack"), Some("ecaflip"));
    }

    #[test]
    fn write_into_missing_directory_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonPersistence::new(dir.path().join("nested"));
        sink.save_tracker(&ItemTracker::new()).unwrap();
        assert!(dir.path().join("nested").join(TRACKER_FILE).exists());
    }
}

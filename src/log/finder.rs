use std::path::{Path, PathBuf};

pub const LOG_FILE_NAME: &str = "wakfu_chat.log";

/// The Ankama launcher writes the chat log under its own config folder.
pub fn get_zaap_logs_path() -> PathBuf {
    let mut path = if cfg!(windows) {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| {
            std::env::var("USERNAME")
                .map(|username| format!("C:\\Users\\{}\\AppData\\Roaming", username))
                .unwrap_or_else(|_| "C:\\Users\\Default\\AppData\\Roaming".to_string())
        });
        PathBuf::from(appdata)
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| {
            std::env::var("USER")
                .map(|user| format!("/home/{}", user))
                .unwrap_or_else(|_| "/home/default".to_string())
        });
        PathBuf::from(home).join(".config")
    };

    path.push("zaap");
    path.push("gamesLogs");
    path.push("wakfu");
    path.push("logs");
    path
}

pub fn default_log_path() -> PathBuf {
    get_zaap_logs_path().join(LOG_FILE_NAME)
}

/// Only the chat log itself is accepted; other game logs use a different
/// format.
pub fn is_chat_log(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(LOG_FILE_NAME))
}

/// Picks the log to tail: an explicit path first, then the configured
/// override, then the launcher default. Paths that do not name the chat log
/// are ignored with a warning.
pub fn resolve_log_path(explicit: Option<PathBuf>, configured: Option<&Path>) -> PathBuf {
    let candidates = explicit
        .into_iter()
        .chain(configured.map(Path::to_path_buf));

    for candidate in candidates {
        if is_chat_log(&candidate) {
            return candidate;
        }
        tracing::warn!(path = %candidate.display(), "not a {} file, ignoring", LOG_FILE_NAME);
    }
    default_log_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_ends_with_chat_log() {
        let path = default_log_path();
        assert!(is_chat_log(&path));
        assert!(path.to_string_lossy().contains("zaap"));
    }

    #[test]
    fn explicit_path_wins_over_configured() {
        let explicit = PathBuf::from("/tmp/a/wakfu_chat.log");
        let configured = PathBuf::from("/tmp/b/wakfu_chat.log");
        assert_eq!(resolve_log_path(Some(explicit.clone()), Some(&configured)), explicit);
        assert_eq!(resolve_log_path(None, Some(&configured)), configured);
    }

    #[test]
    fn wrong_file_names_fall_through() {
        let bogus = PathBuf::from("/tmp/wakfu.log");
        let configured = PathBuf::from("/tmp/b/WAKFU_CHAT.LOG");
        assert_eq!(resolve_log_path(Some(bogus.clone()), Some(&configured)), configured);
        assert_eq!(resolve_log_path(Some(bogus), None), default_log_path());
    }
}

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by a tailed log source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The writer holds the file or a read came back short; retry next tick.
    #[error("log file is temporarily unreadable: {0}")]
    Busy(String),
    /// The file was moved, deleted or access was revoked.
    #[error("lost access to log file: {0}")]
    Lost(String),
    #[error("log read failed: {0}")]
    Io(#[from] io::Error),
}

impl SourceError {
    /// Sorts a raw I/O error into the tailing taxonomy.
    pub fn classify(err: io::Error) -> Self {
        // 32 and 33 are the Windows sharing and lock violations.
        if matches!(err.raw_os_error(), Some(32) | Some(33)) {
            return SourceError::Busy(err.to_string());
        }
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::UnexpectedEof | io::ErrorKind::Interrupted => {
                SourceError::Busy(err.to_string())
            }
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => SourceError::Lost(err.to_string()),
            _ => SourceError::Io(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

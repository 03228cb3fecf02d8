use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::SourceError;

/// A growing byte stream the tail driver polls.
pub trait LogSource {
    fn size(&mut self) -> Result<u64, SourceError>;
    fn read_range(&mut self, offset: u64, len: u64) -> Result<Vec<u8>, SourceError>;
}

/// The game's chat log on disk. The file is reopened on every read so the
/// game client can rotate or recreate it underneath us.
#[derive(Debug, Clone)]
pub struct FileLogSource {
    path: PathBuf,
}

impl FileLogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSource for FileLogSource {
    fn size(&mut self) -> Result<u64, SourceError> {
        fs::metadata(&self.path)
            .map(|m| m.len())
            .map_err(SourceError::classify)
    }

    fn read_range(&mut self, offset: u64, len: u64) -> Result<Vec<u8>, SourceError> {
        let mut file = File::open(&self.path).map_err(SourceError::classify)?;
        file.seek(SeekFrom::Start(offset)).map_err(SourceError::classify)?;

        let mut buffer = Vec::with_capacity(len as usize);
        file.take(len)
            .read_to_end(&mut buffer)
            .map_err(SourceError::classify)?;

        if (buffer.len() as u64) < len {
            return Err(SourceError::Busy(format!(
                "short read: wanted {} bytes at offset {}, got {}",
                len,
                offset,
                buffer.len()
            )));
        }
        Ok(buffer)
    }
}

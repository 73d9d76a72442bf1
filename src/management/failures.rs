use std::{fmt, io::Error, path::Path};

use crate::types::SourceTrack;

#[derive(Debug)]
pub enum FailureLogError {
    IoError(Error),
    SerdeError(serde_json::Error),
}

impl From<Error> for FailureLogError {
    fn from(err: Error) -> Self {
        FailureLogError::IoError(err)
    }
}

impl fmt::Display for FailureLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureLogError::IoError(e) => write!(f, "{}", e),
            FailureLogError::SerdeError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for FailureLogError {}

/// Source tracks that could not be resolved, in playlist order.
#[derive(Debug, Default)]
pub struct FailureLog {
    tracks: Vec<SourceTrack>,
}

impl FailureLog {
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    pub fn add(&mut self, track: SourceTrack) {
        self.tracks.push(track);
    }

    pub fn get_tracks(&self) -> &Vec<SourceTrack> {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Writes the log to `path` unless it is empty. Returns whether a file
    /// was written. Missing parent directories are created.
    pub async fn persist(&self, path: &Path) -> Result<bool, FailureLogError> {
        if self.tracks.is_empty() {
            return Ok(false);
        }

        let json =
            serde_json::to_string_pretty(&self.tracks).map_err(FailureLogError::SerdeError)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await?;
            }
        }

        async_fs::write(path, json).await?;
        Ok(true)
    }
}

use std::{
    fmt,
    io::{Error, ErrorKind},
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::types::{HarmonySong, ResolvedTrack};

pub const SONGS_KEY: &str = "songs";

#[derive(Debug)]
pub enum TemplateError {
    LoadError(PathBuf, Error),
    InvalidJson(PathBuf, serde_json::Error),
    StructureError(String),
    SaveError(PathBuf, Error),
    SerdeError(serde_json::Error),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::LoadError(path, e) if e.kind() == ErrorKind::NotFound => {
                write!(f, "Template file not found: {}", path.display())
            }
            TemplateError::LoadError(path, e) => {
                write!(f, "Error reading template file {}: {}", path.display(), e)
            }
            TemplateError::InvalidJson(path, e) => {
                write!(f, "Invalid JSON in template file {}: {}", path.display(), e)
            }
            TemplateError::StructureError(msg) => write!(f, "Invalid playlist structure: {}", msg),
            TemplateError::SaveError(path, e) => {
                write!(f, "Error saving playlist to {}: {}", path.display(), e)
            }
            TemplateError::SerdeError(e) => write!(f, "Error serializing playlist: {}", e),
        }
    }
}

impl std::error::Error for TemplateError {}

/// In-memory Harmony Music playlist document built from a template.
///
/// The template is kept as raw JSON so every key Harmony Music wrote into it
/// survives the round trip untouched, in its original order. Only the
/// `songs` array is ever modified.
pub struct HarmonyPlaylist {
    document: Value,
}

impl HarmonyPlaylist {
    /// Reads and parses the template at `path`.
    ///
    /// The presence of the `songs` array is not checked here; a template
    /// without one fails on the first [`HarmonyPlaylist::append_track`].
    pub async fn load_template(path: &Path) -> Result<Self, TemplateError> {
        let content = async_fs::read_to_string(path)
            .await
            .map_err(|e| TemplateError::LoadError(path.to_path_buf(), e))?;
        let document: Value = serde_json::from_str(&content)
            .map_err(|e| TemplateError::InvalidJson(path.to_path_buf(), e))?;
        Ok(Self { document })
    }

    pub fn from_document(document: Value) -> Self {
        Self { document }
    }

    pub fn append_track(&mut self, track: ResolvedTrack) -> Result<(), TemplateError> {
        let song =
            serde_json::to_value(HarmonySong::from(track)).map_err(TemplateError::SerdeError)?;
        self.songs_mut()?.push(song);
        Ok(())
    }

    /// Writes the whole document, replacing whatever is at `path`. Missing
    /// parent directories are created.
    pub async fn save(&self, path: &Path) -> Result<(), TemplateError> {
        let json =
            serde_json::to_string_pretty(&self.document).map_err(TemplateError::SerdeError)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent)
                    .await
                    .map_err(|e| TemplateError::SaveError(path.to_path_buf(), e))?;
            }
        }

        async_fs::write(path, json)
            .await
            .map_err(|e| TemplateError::SaveError(path.to_path_buf(), e))
    }

    pub fn song_count(&self) -> Option<usize> {
        self.document
            .get(SONGS_KEY)
            .and_then(Value::as_array)
            .map(Vec::len)
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    fn songs_mut(&mut self) -> Result<&mut Vec<Value>, TemplateError> {
        let object = self.document.as_object_mut().ok_or_else(|| {
            TemplateError::StructureError("template root is not a JSON object".to_string())
        })?;

        match object.get_mut(SONGS_KEY) {
            Some(Value::Array(songs)) => Ok(songs),
            Some(_) => Err(TemplateError::StructureError(format!(
                "'{}' is not an array",
                SONGS_KEY
            ))),
            None => Err(TemplateError::StructureError(format!(
                "'{}' key not found",
                SONGS_KEY
            ))),
        }
    }
}

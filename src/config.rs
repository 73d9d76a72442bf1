//! Configuration management for harmonize.
//!
//! This module loads configuration values from environment variables and
//! `.env` files and bundles them into a [`Config`] value. The value is built
//! once at start-up and handed to the clients that need it; nothing reads the
//! environment after that.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults (where applicable)

use std::{env, fmt, path::PathBuf};

use crate::Res;

pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_API_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_YTMUSIC_API_URL: &str = "https://music.youtube.com/youtubei/v1";

pub const PLAYLIST_OUTPUT_FILE: &str = "harmony_playlist.json";
pub const FAILED_TRACKS_OUTPUT_FILE: &str = "failed_tracks.json";

/// Loads environment variables from `.env` files.
///
/// Creates the `harmonize` directory inside the platform-specific local data
/// directory if it doesn't exist and loads `harmonize/.env` from there. When
/// that file is absent, a `.env` in the working directory is tried instead.
/// Having neither is not an error: the variables may come from the process
/// environment.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/harmonize/.env`
/// - macOS: `~/Library/Application Support/harmonize/.env`
/// - Windows: `%LOCALAPPDATA%/harmonize/.env`
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or an existing
/// `.env` file cannot be read or parsed.
///
/// # Example
///
/// ```
/// use harmonize::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Res<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)?;
    } else {
        match dotenv::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Directory holding the `.env` file and the token cache.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("harmonize");
    path
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "{} must be set", name),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Runtime configuration, constructed once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_api_url: String,
    pub spotify_token_url: String,
    pub ytmusic_api_url: String,
    pub token_cache_path: PathBuf,
    pub output_dir: PathBuf,
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// `SPOTIFY_ID` and `SPOTIFY_SECRET` are required; every other value
    /// falls back to its default when unset or empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first absent required
    /// variable.
    ///
    /// # Example
    ///
    /// ```
    /// let config = Config::from_env()?;
    /// println!("Token cache at {}", config.token_cache_path.display());
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            spotify_client_id: required("SPOTIFY_ID")?,
            spotify_client_secret: required("SPOTIFY_SECRET")?,
            spotify_api_url: optional("SPOTIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.to_string()),
            spotify_token_url: optional("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_API_TOKEN_URL.to_string()),
            ytmusic_api_url: optional("YTMUSIC_API_URL")
                .unwrap_or_else(|| DEFAULT_YTMUSIC_API_URL.to_string()),
            token_cache_path: optional("TOKEN_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir().join("cache/token.json")),
            output_dir: optional("HARMONIZE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    pub fn playlist_output_path(&self) -> PathBuf {
        self.output_dir.join(PLAYLIST_OUTPUT_FILE)
    }

    pub fn failed_tracks_output_path(&self) -> PathBuf {
        self.output_dir.join(FAILED_TRACKS_OUTPUT_FILE)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

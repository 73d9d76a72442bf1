use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

/// Bearer credential as stored in the token cache file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    /// Epoch seconds.
    pub expires_at: i64,
    pub token_type: String,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksResponse {
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<PlaylistTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<PlaylistArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistArtist {
    pub name: String,
}

/// A Spotify track reduced to what is needed to search for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTrack {
    pub name: String,
    pub artist: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// One row of a YouTube Music search, as much of it as could be parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogHit {
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub artists: Vec<Artist>,
    pub album: Option<Album>,
    pub thumbnails: Vec<Thumbnail>,
    pub duration: Option<String>,
}

/// A catalog hit that carries everything a Harmony Music song needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTrack {
    pub id: String,
    pub title: String,
    pub artists: Vec<Artist>,
    pub album: Option<Album>,
    pub thumbnails: Vec<Thumbnail>,
    pub duration_text: Option<String>,
}

/// A song entry in the Harmony Music playlist schema.
///
/// Field order is the on-disk key order. Fields Harmony Music fills in on its
/// own are always written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarmonySong {
    pub video_id: String,
    pub title: String,
    pub album: Option<Album>,
    pub artists: Vec<Artist>,
    pub length: Option<String>,
    pub duration: Option<Value>,
    pub date: Option<Value>,
    pub thumbnails: Vec<Thumbnail>,
    pub url: Option<Value>,
    pub track_details: Option<Value>,
    pub year: Option<Value>,
}

impl From<ResolvedTrack> for HarmonySong {
    fn from(track: ResolvedTrack) -> Self {
        HarmonySong {
            video_id: track.id,
            title: track.title,
            album: track.album,
            artists: track.artists,
            length: track.duration_text,
            duration: None,
            date: None,
            thumbnails: track.thumbnails,
            url: None,
            track_details: None,
            year: None,
        }
    }
}

#[derive(Tabled)]
pub struct FailedTrackRow {
    pub name: String,
    pub artist: String,
}

impl From<&SourceTrack> for FailedTrackRow {
    fn from(track: &SourceTrack) -> Self {
        FailedTrackRow {
            name: track.name.clone(),
            artist: track.artist.clone(),
        }
    }
}

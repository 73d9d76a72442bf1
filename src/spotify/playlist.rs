use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::sleep;

use crate::{
    config::Config,
    observer::{ConversionObserver, ErrorEvent, ProgressEvent},
    types::{PlaylistTracksResponse, SourceTrack},
    utils,
};

/// Spotify's maximum number of items per playlist page.
pub const PAGE_SIZE: u32 = 50;

/// Pause between page requests to stay clear of the rate limit.
pub const PAGE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum FetchError {
    RequestError(reqwest::Error),
    InvalidResponse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::RequestError(err)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::RequestError(e) => write!(f, "{}", e),
            FetchError::InvalidResponse(msg) => {
                write!(f, "unexpected API response format: {}", msg)
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// One page of a playlist's track listing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    async fn tracks_page(
        &self,
        token: &str,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<PlaylistTracksResponse, FetchError>;
}

pub struct SpotifyClient {
    client: Client,
    api_url: String,
}

impl SpotifyClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_url: config.spotify_api_url.clone(),
        }
    }
}

#[async_trait]
impl PlaylistSource for SpotifyClient {
    /// Retrieves one page of playlist items.
    ///
    /// Uses Spotify's `/playlists/{id}/tracks` endpoint with `limit` and
    /// `offset`. A single attempt is made; any network error, non-2xx status
    /// or body without an `items` array is returned as a [`FetchError`].
    ///
    /// # API Documentation
    ///
    /// <https://developer.spotify.com/documentation/web-api/reference/get-playlists-tracks>
    async fn tracks_page(
        &self,
        token: &str,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<PlaylistTracksResponse, FetchError> {
        let api_url = format!(
            "{uri}/playlists/{id}/tracks?limit={limit}&offset={offset}",
            uri = self.api_url,
            id = playlist_id,
            limit = limit,
            offset = offset
        );

        let response = self
            .client
            .get(&api_url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        if body.get("items").is_none() {
            return Err(FetchError::InvalidResponse("missing 'items'".to_string()));
        }

        serde_json::from_value(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }
}

/// Walks a playlist page by page and flattens it into search-ready tracks.
pub struct PlaylistFetcher<S> {
    source: S,
    page_size: u32,
    page_delay: Duration,
}

impl<S: PlaylistSource> PlaylistFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            page_size: PAGE_SIZE,
            page_delay: PAGE_DELAY,
        }
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Retrieves every track of `playlist_id` in playlist order.
    ///
    /// # Pagination
    ///
    /// Starts at offset 0 and advances by the page size. Fetching stops when
    /// a page comes back empty, when a page holds fewer items than the page
    /// size, or when a request fails. The last case is reported through the
    /// observer and the tracks gathered so far are returned; this function
    /// itself never fails.
    ///
    /// Items without a track (removed or unavailable tracks) are dropped, but
    /// still count towards the page length used for the stop check, so a page
    /// with holes does not end pagination early.
    ///
    /// Duplicates are kept.
    pub async fn fetch_all(
        &self,
        token: &str,
        playlist_id: &str,
        observer: &dyn ConversionObserver,
    ) -> Vec<SourceTrack> {
        let mut all_tracks: Vec<SourceTrack> = Vec::new();
        let mut offset = 0;

        observer.on_progress(ProgressEvent::FetchingTracks { playlist_id });

        loop {
            let page = match self
                .source
                .tracks_page(token, playlist_id, self.page_size, offset)
                .await
            {
                Ok(page) => page,
                Err(error) => {
                    observer.on_error(ErrorEvent::PageFailed {
                        offset,
                        error: &error,
                    });
                    break;
                }
            };

            if page.items.is_empty() {
                observer.on_progress(ProgressEvent::EndOfPlaylist);
                break;
            }

            let page_len = page.items.len();
            let batch: Vec<SourceTrack> = page
                .items
                .iter()
                .filter_map(|item| item.track.as_ref())
                .map(utils::to_source_track)
                .collect();

            let retrieved = batch.len();
            all_tracks.extend(batch);
            observer.on_progress(ProgressEvent::PageFetched {
                offset,
                retrieved,
                total: all_tracks.len(),
            });

            if page_len < self.page_size as usize {
                break;
            }

            offset += self.page_size;
            if !self.page_delay.is_zero() {
                sleep(self.page_delay).await;
            }
        }

        observer.on_progress(ProgressEvent::TracksFetched {
            total: all_tracks.len(),
        });
        all_tracks
    }
}

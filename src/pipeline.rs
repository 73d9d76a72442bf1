//! The conversion pipeline.
//!
//! A [`Converter`] walks a single run through its stages:
//!
//! ```text
//! Init ──auth──▶ Authenticated ──template, fetch──▶ Fetched ──▶ Resolving ──▶ Finalized
//!   │                  │
//!   └──────────────────┴──▶ Aborted
//! ```
//!
//! Authentication failures, unreadable templates and playlists that yield no
//! tracks abort before anything is written. Once resolving starts, a track
//! that cannot be found only lands in the failure log; the loop always runs
//! over every track. The only other way out of the loop is a template without
//! a `songs` array, which surfaces on the first append and aborts the run.
//!
//! Everything is sequential. Tracks are resolved and appended strictly in
//! playlist order, so the songs added to the document are the resolved
//! tracks in their original relative order.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    management::{FailureLog, HarmonyPlaylist, TemplateError},
    observer::{ConversionObserver, ErrorEvent, ProgressEvent},
    spotify::{
        auth::{AuthError, Authenticator, TokenProvider},
        playlist::{PlaylistFetcher, PlaylistSource},
    },
    types::{Credential, SourceTrack},
    ytmusic::{CatalogResolver, CatalogService, Resolution},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Authenticated,
    Fetched,
    Resolving,
    Finalized,
    Aborted,
}

#[derive(Debug)]
pub enum ConversionError {
    Auth(AuthError),
    Template(TemplateError),
    NoTracks(String),
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::Auth(e) => write!(f, "Spotify authentication failed: {}", e),
            ConversionError::Template(e) => write!(f, "{}", e),
            ConversionError::NoTracks(playlist_id) => write!(
                f,
                "No tracks found or error fetching playlist {} from Spotify",
                playlist_id
            ),
        }
    }
}

impl std::error::Error for ConversionError {}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub playlist: PathBuf,
    pub failed_tracks: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<SourceTrack>,
    /// Set when the playlist document was written.
    pub playlist_path: Option<PathBuf>,
    /// Set when the failure log was written.
    pub failed_tracks_path: Option<PathBuf>,
}

impl ConversionSummary {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} succeeded, {} failed",
            self.succeeded,
            self.total,
            self.failed_count()
        )
    }
}

pub struct Converter<'a, P, S, C> {
    authenticator: Authenticator<P>,
    fetcher: PlaylistFetcher<S>,
    resolver: CatalogResolver<C>,
    outputs: OutputPaths,
    observer: &'a dyn ConversionObserver,
    stage: Stage,
    credential: Option<Credential>,
}

impl<'a, P, S, C> Converter<'a, P, S, C>
where
    P: TokenProvider,
    S: PlaylistSource,
    C: CatalogService,
{
    pub fn new(
        authenticator: Authenticator<P>,
        fetcher: PlaylistFetcher<S>,
        resolver: CatalogResolver<C>,
        outputs: OutputPaths,
        observer: &'a dyn ConversionObserver,
    ) -> Self {
        Self {
            authenticator,
            fetcher,
            resolver,
            outputs,
            observer,
            stage: Stage::Init,
            credential: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Moves from `Init` to `Authenticated` ahead of [`Converter::run`], so a
    /// bad credential surfaces before any other input is collected. The
    /// credential is kept for the next run.
    pub async fn authenticate(&mut self) -> Result<(), ConversionError> {
        match self.obtain_credential().await {
            Ok(_) => Ok(()),
            Err(error) => {
                self.stage = Stage::Aborted;
                self.observer.on_error(ErrorEvent::Aborted { error: &error });
                Err(error)
            }
        }
    }

    /// Converts `playlist_id` into a Harmony Music playlist based on the
    /// template at `template_path`. Authenticates first unless
    /// [`Converter::authenticate`] already did.
    ///
    /// # Returns
    ///
    /// - `Ok(ConversionSummary)` once every track went through resolution,
    ///   even if some or all of them were not found, and even if writing an
    ///   output file failed (reported through the observer)
    /// - `Err(ConversionError)` when the run aborted; no output was written
    ///
    /// # Invariants
    ///
    /// `summary.succeeded + summary.failed_count() == summary.total`, and the
    /// document gained exactly `summary.succeeded` songs.
    pub async fn run(
        &mut self,
        playlist_id: &str,
        template_path: &Path,
    ) -> Result<ConversionSummary, ConversionError> {
        if self.credential.is_none() {
            self.stage = Stage::Init;
        }
        let result = self.convert(playlist_id, template_path).await;
        if let Err(error) = &result {
            self.stage = Stage::Aborted;
            self.observer.on_error(ErrorEvent::Aborted { error });
        }
        result
    }

    async fn convert(
        &mut self,
        playlist_id: &str,
        template_path: &Path,
    ) -> Result<ConversionSummary, ConversionError> {
        let observer = self.observer;
        let access_token = self.obtain_credential().await?.access_token;

        let mut playlist = HarmonyPlaylist::load_template(template_path)
            .await
            .map_err(ConversionError::Template)?;
        observer.on_progress(ProgressEvent::TemplateLoaded {
            path: template_path,
        });

        let tracks = self
            .fetcher
            .fetch_all(&access_token, playlist_id, observer)
            .await;
        if tracks.is_empty() {
            return Err(ConversionError::NoTracks(playlist_id.to_string()));
        }
        self.stage = Stage::Fetched;

        self.stage = Stage::Resolving;
        let total = tracks.len();
        let mut succeeded = 0;
        let mut failures = FailureLog::new();

        for (i, track) in tracks.into_iter().enumerate() {
            observer.on_progress(ProgressEvent::Searching {
                index: i + 1,
                total,
                track: &track,
            });

            let resolution = self.resolver.resolve(&track.query, observer).await;
            match resolution {
                Resolution::Found(resolved) => {
                    observer.on_progress(ProgressEvent::TrackFound { track: &resolved });
                    playlist
                        .append_track(resolved)
                        .map_err(ConversionError::Template)?;
                    succeeded += 1;
                }
                Resolution::NotFound => {
                    observer.on_progress(ProgressEvent::TrackNotFound { track: &track });
                    failures.add(track);
                }
            }
        }

        let summary = self.finalize(&playlist, &failures, total, succeeded).await;
        self.stage = Stage::Finalized;
        self.credential = None;
        observer.on_progress(ProgressEvent::Completed { summary: &summary });
        Ok(summary)
    }

    async fn obtain_credential(&mut self) -> Result<Credential, ConversionError> {
        if let Some(credential) = &self.credential {
            return Ok(credential.clone());
        }

        let credential = self
            .authenticator
            .obtain_token(self.observer)
            .await
            .map_err(ConversionError::Auth)?;
        self.stage = Stage::Authenticated;
        self.credential = Some(credential.clone());
        Ok(credential)
    }

    async fn finalize(
        &self,
        playlist: &HarmonyPlaylist,
        failures: &FailureLog,
        total: usize,
        succeeded: usize,
    ) -> ConversionSummary {
        let playlist_path = &self.outputs.playlist;
        let playlist_saved = match playlist.save(playlist_path).await {
            Ok(()) => {
                self.observer.on_progress(ProgressEvent::PlaylistSaved {
                    path: playlist_path,
                });
                true
            }
            Err(error) => {
                self.observer.on_error(ErrorEvent::PlaylistNotSaved {
                    path: playlist_path,
                    error: &error,
                });
                false
            }
        };

        let failed_path = &self.outputs.failed_tracks;
        let failures_saved = match failures.persist(failed_path).await {
            Ok(written) => {
                if written {
                    self.observer.on_progress(ProgressEvent::FailedTracksSaved {
                        path: failed_path,
                        count: failures.len(),
                    });
                }
                written
            }
            Err(error) => {
                self.observer.on_error(ErrorEvent::FailedTracksNotSaved {
                    path: failed_path,
                    error: &error,
                });
                false
            }
        };

        ConversionSummary {
            total,
            succeeded,
            failed: failures.get_tracks().clone(),
            playlist_path: playlist_saved.then(|| playlist_path.clone()),
            failed_tracks_path: failures_saved.then(|| failed_path.clone()),
        }
    }
}

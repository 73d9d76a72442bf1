//! Progress and error events emitted while a playlist is converted.
//!
//! The pipeline and its components never print. They report what they do to
//! a [`ConversionObserver`], and the CLI decides how that is presented.

use std::path::Path;

use crate::{
    management::{CacheError, FailureLogError, TemplateError},
    pipeline::{ConversionError, ConversionSummary},
    spotify::{auth::AuthError, playlist::FetchError},
    types::{ResolvedTrack, SourceTrack},
    ytmusic::SearchError,
};

#[derive(Debug)]
pub enum ProgressEvent<'a> {
    UsingCachedToken,
    RequestingToken,
    TokenCached,
    TemplateLoaded {
        path: &'a Path,
    },
    FetchingTracks {
        playlist_id: &'a str,
    },
    PageFetched {
        offset: u32,
        retrieved: usize,
        total: usize,
    },
    EndOfPlaylist,
    TracksFetched {
        total: usize,
    },
    Searching {
        index: usize,
        total: usize,
        track: &'a SourceTrack,
    },
    TrackFound {
        track: &'a ResolvedTrack,
    },
    TrackNotFound {
        track: &'a SourceTrack,
    },
    PlaylistSaved {
        path: &'a Path,
    },
    FailedTracksSaved {
        path: &'a Path,
        count: usize,
    },
    Completed {
        summary: &'a ConversionSummary,
    },
}

#[derive(Debug)]
pub enum ErrorEvent<'a> {
    TokenCacheUnreadable {
        path: &'a Path,
        error: &'a CacheError,
    },
    TokenCacheNotWritten {
        path: &'a Path,
        error: &'a CacheError,
    },
    TokenRequestFailed {
        error: &'a AuthError,
    },
    PageFailed {
        offset: u32,
        error: &'a FetchError,
    },
    SearchFailed {
        query: &'a str,
        error: &'a SearchError,
    },
    PlaylistNotSaved {
        path: &'a Path,
        error: &'a TemplateError,
    },
    FailedTracksNotSaved {
        path: &'a Path,
        error: &'a FailureLogError,
    },
    Aborted {
        error: &'a ConversionError,
    },
}

pub trait ConversionObserver: Send + Sync {
    fn on_progress(&self, event: ProgressEvent<'_>);
    fn on_error(&self, event: ErrorEvent<'_>);
}

/// Discards every event.
pub struct SilentObserver;

impl ConversionObserver for SilentObserver {
    fn on_progress(&self, _event: ProgressEvent<'_>) {}
    fn on_error(&self, _event: ErrorEvent<'_>) {}
}

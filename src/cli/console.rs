use std::{sync::Mutex, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    info,
    observer::{ConversionObserver, ErrorEvent, ProgressEvent},
    success,
    types::FailedTrackRow,
    utils, warning,
};

/// Prints pipeline events with the console macros and shows a progress bar
/// while tracks are being searched.
pub struct ConsoleObserver {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    /// Runs `print` without tearing the progress bar.
    fn say(&self, print: impl FnOnce()) {
        match self.bar.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(bar) => bar.suspend(print),
                None => print(),
            },
            Err(_) => print(),
        }
    }

    fn start_bar(&self, total: usize) {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.blue} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                f(bar);
            }
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionObserver for ConsoleObserver {
    fn on_progress(&self, event: ProgressEvent<'_>) {
        match event {
            ProgressEvent::UsingCachedToken => info!("Using cached Spotify token"),
            ProgressEvent::RequestingToken => info!("Getting new Spotify token..."),
            ProgressEvent::TokenCached => success!("New Spotify token cached"),
            ProgressEvent::TemplateLoaded { path } => {
                success!("Loaded Harmony template: {}", path.display())
            }
            ProgressEvent::FetchingTracks { playlist_id } => {
                info!("Fetching tracks of playlist {} from Spotify...", playlist_id)
            }
            ProgressEvent::PageFetched {
                retrieved, total, ..
            } => info!("Retrieved {} tracks... Total: {}", retrieved, total),
            ProgressEvent::EndOfPlaylist => success!("Reached end of playlist"),
            ProgressEvent::TracksFetched { total } => {
                if total > 0 {
                    success!("Found {} tracks in Spotify playlist", total);
                    info!("Searching for tracks on YouTube Music...");
                }
            }
            ProgressEvent::Searching {
                index,
                total,
                track,
            } => {
                if index == 1 {
                    self.start_bar(total);
                }
                self.with_bar(|bar| bar.set_message(format!("Searching '{}'", track.name)));
            }
            ProgressEvent::TrackFound { track } => {
                self.say(|| {
                    success!(
                        "Found: {} - {}",
                        track.title,
                        utils::join_artist_names(&track.artists)
                    )
                });
                self.with_bar(|bar| bar.inc(1));
            }
            ProgressEvent::TrackNotFound { track } => {
                self.say(|| warning!("Not found: {} - {}", track.name, track.artist));
                self.with_bar(|bar| bar.inc(1));
            }
            ProgressEvent::PlaylistSaved { path } => {
                self.finish_bar();
                success!("Harmony playlist saved: {}", path.display());
            }
            ProgressEvent::FailedTracksSaved { path, count } => {
                info!("{} failed tracks saved to '{}'", count, path.display())
            }
            ProgressEvent::Completed { summary } => {
                self.finish_bar();
                success!("Conversion complete!");
                success!(
                    "Successfully added: {}/{} tracks",
                    summary.succeeded,
                    summary.total
                );

                if summary.failed_count() > 0 {
                    warning!("Failed to find/add: {} tracks", summary.failed_count());
                    let rows: Vec<FailedTrackRow> =
                        summary.failed.iter().map(FailedTrackRow::from).collect();
                    println!("{}", Table::new(rows));
                }

                if let Some(path) = &summary.playlist_path {
                    info!("Output file: {}", path.display());
                }
            }
        }
    }

    fn on_error(&self, event: ErrorEvent<'_>) {
        match event {
            ErrorEvent::TokenCacheUnreadable { path, error } => warning!(
                "Token cache {} unusable ({}), getting new token",
                path.display(),
                error
            ),
            ErrorEvent::TokenCacheNotWritten { path, error } => {
                warning!("Failed to save token to cache {}: {}", path.display(), error)
            }
            ErrorEvent::TokenRequestFailed { error } => {
                warning!("Error getting Spotify token: {}", error)
            }
            ErrorEvent::PageFailed { offset, error } => {
                warning!("Error fetching Spotify tracks (offset {}): {}", offset, error)
            }
            ErrorEvent::SearchFailed { query, error } => {
                self.say(|| warning!("Search for '{}' failed: {}", query, error))
            }
            ErrorEvent::PlaylistNotSaved { error, .. } => {
                self.finish_bar();
                warning!("{}", error);
            }
            ErrorEvent::FailedTracksNotSaved { path, error } => warning!(
                "Failed to save failed tracks to {}: {}",
                path.display(),
                error
            ),
            ErrorEvent::Aborted { .. } => self.finish_bar(),
        }
    }
}

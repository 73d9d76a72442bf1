use std::path::PathBuf;

use reqwest::Client;

use crate::{
    cli::ConsoleObserver,
    config::Config,
    error, info,
    management::TokenCache,
    pipeline::{Converter, OutputPaths},
    spotify::{
        auth::{Authenticator, SpotifyTokenProvider},
        playlist::{PlaylistFetcher, SpotifyClient},
    },
    utils,
    ytmusic::{CatalogResolver, YtMusicClient},
};

pub async fn convert(config: &Config) {
    info!("Spotify to Harmony Music playlist converter");

    let client = Client::new();
    let observer = ConsoleObserver::new();

    let authenticator = Authenticator::new(
        SpotifyTokenProvider::new(client.clone(), config),
        TokenCache::new(config.token_cache_path.clone()),
    );
    let fetcher = PlaylistFetcher::new(SpotifyClient::new(client.clone(), config));
    let resolver = CatalogResolver::new(YtMusicClient::new(client, config));
    let outputs = OutputPaths {
        playlist: config.playlist_output_path(),
        failed_tracks: config.failed_tracks_output_path(),
    };

    let mut converter = Converter::new(authenticator, fetcher, resolver, outputs, &observer);
    if let Err(e) = converter.authenticate().await {
        error!("{}", e);
    }

    let playlist_id = match utils::prompt("Enter Spotify playlist ID: ") {
        Ok(input) if !input.is_empty() => utils::parse_playlist_id(&input),
        Ok(_) => error!("No playlist ID given."),
        Err(e) => error!("Cannot read playlist ID: {}", e),
    };

    let template_path = match utils::prompt(
        "Enter name of harmony playlist template (e.g., empty_playlist.json): ",
    ) {
        Ok(input) if !input.is_empty() => PathBuf::from(input),
        Ok(_) => error!("No template file given."),
        Err(e) => error!("Cannot read template file name: {}", e),
    };

    if let Err(e) = converter.run(&playlist_id, &template_path).await {
        error!("{}", e);
    }
}

use std::io::{self, BufRead, Write};

use crate::types::{Artist, PlaylistTrack, SourceTrack};

pub fn build_search_query(name: &str, artist: &str) -> String {
    if artist.is_empty() {
        name.to_string()
    } else {
        format!("{} {}", name, artist)
    }
}

pub fn to_source_track(track: &PlaylistTrack) -> SourceTrack {
    let artist = track
        .artists
        .first()
        .map(|a| a.name.clone())
        .unwrap_or_default();

    SourceTrack {
        query: build_search_query(&track.name, &artist),
        name: track.name.clone(),
        artist,
    }
}

pub fn join_artist_names(artists: &[Artist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `m:ss` or `h:mm:ss`.
pub fn is_duration_text(text: &str) -> bool {
    let parts: Vec<&str> = text.split(':').collect();
    parts.len() >= 2
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

pub fn is_year_text(text: &str) -> bool {
    text.len() == 4 && text.chars().all(|c| c.is_ascii_digit())
}

pub fn prompt(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Accepts a bare playlist id, a `spotify:playlist:<id>` URI or an
/// `open.spotify.com/playlist/<id>` link.
pub fn parse_playlist_id(input: &str) -> String {
    let input = input.trim();

    if let Some(id) = input.strip_prefix("spotify:playlist:") {
        return id.to_string();
    }

    if let Some((_, rest)) = input.split_once("/playlist/") {
        return rest
            .split(['?', '/', '#'])
            .next()
            .unwrap_or_default()
            .to_string();
    }

    input.to_string()
}

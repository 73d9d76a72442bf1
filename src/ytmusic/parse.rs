//! Song rows out of a YouTube Music search response.
//!
//! The search endpoint answers with the renderer tree the web client draws
//! from. Song results live in a `musicShelfRenderer` whose entries are
//! `musicResponsiveListItemRenderer`s:
//!
//! ```text
//! flexColumns[0]  title
//! flexColumns[1]  artist(s) • album • duration, separated by " • " / " & " runs
//! thumbnail       musicThumbnailRenderer.thumbnail.thumbnails[]
//! playlistItemData.videoId (or the play button's watchEndpoint)
//! ```
//!
//! Parsing is lenient: a row missing a piece yields a [`CatalogHit`] with that
//! field empty, and deciding whether that is good enough is left to the
//! resolver.

use serde_json::Value;

use crate::{
    types::{Album, Artist, CatalogHit, Thumbnail},
    utils,
};

const SECTIONS_TABBED: &str =
    "/contents/tabbedSearchResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents";
const SECTIONS_PLAIN: &str = "/contents/sectionListRenderer/contents";
const LIST_ITEM: &str = "musicResponsiveListItemRenderer";
const FLEX_COLUMN_RUNS: &str = "musicResponsiveListItemFlexColumnRenderer/text/runs";
const OVERLAY_VIDEO_ID: &str = "/overlay/musicItemThumbnailOverlayRenderer/content/\
    musicPlayButtonRenderer/playNavigationEndpoint/watchEndpoint/videoId";
const BROWSE_PAGE_TYPE: &str =
    "/browseEndpointContextSupportedConfigs/browseEndpointContextMusicConfig/pageType";

const PAGE_TYPE_ALBUM: &str = "MUSIC_PAGE_TYPE_ALBUM";
const PAGE_TYPE_ARTIST: &str = "MUSIC_PAGE_TYPE_ARTIST";
const PAGE_TYPE_USER_CHANNEL: &str = "MUSIC_PAGE_TYPE_USER_CHANNEL";

pub fn parse_search_results(body: &Value) -> Vec<CatalogHit> {
    let sections = body
        .pointer(SECTIONS_TABBED)
        .or_else(|| body.pointer(SECTIONS_PLAIN))
        .and_then(Value::as_array);

    sections
        .into_iter()
        .flatten()
        .filter_map(|section| {
            section
                .pointer("/musicShelfRenderer/contents")
                .and_then(Value::as_array)
        })
        .flatten()
        .filter_map(|item| item.get(LIST_ITEM))
        .map(parse_list_item)
        .collect()
}

fn parse_list_item(renderer: &Value) -> CatalogHit {
    let video_id = str_at(renderer, "/playlistItemData/videoId")
        .or_else(|| str_at(renderer, OVERLAY_VIDEO_ID));

    let title = flex_column_runs(renderer, 0)
        .and_then(|runs| runs.first())
        .and_then(|run| run.get("text"))
        .and_then(Value::as_str)
        .map(String::from);

    let thumbnails = renderer
        .pointer("/thumbnail/musicThumbnailRenderer/thumbnail/thumbnails")
        .and_then(|t| serde_json::from_value::<Vec<Thumbnail>>(t.clone()).ok())
        .unwrap_or_default();

    let mut hit = CatalogHit {
        video_id,
        title,
        thumbnails,
        ..CatalogHit::default()
    };

    if let Some(runs) = flex_column_runs(renderer, 1) {
        parse_song_runs(runs, &mut hit);
    }

    hit
}

/// Fills artists, album and duration from the subtitle column. A four-digit
/// run only counts as the release year once the album has been seen.
fn parse_song_runs(runs: &[Value], hit: &mut CatalogHit) {
    // odd runs are separators
    for run in runs.iter().step_by(2) {
        let text = run.get("text").and_then(Value::as_str).unwrap_or_default();

        if let Some(browse) = run.pointer("/navigationEndpoint/browseEndpoint") {
            let id = browse
                .get("browseId")
                .and_then(Value::as_str)
                .map(String::from);
            let page_type = browse.pointer(BROWSE_PAGE_TYPE).and_then(Value::as_str);

            match page_type {
                Some(PAGE_TYPE_ALBUM) => {
                    hit.album = Some(Album {
                        name: text.to_string(),
                        id,
                    })
                }
                Some(PAGE_TYPE_ARTIST) | Some(PAGE_TYPE_USER_CHANNEL) => hit.artists.push(Artist {
                    name: text.to_string(),
                    id,
                }),
                _ => {}
            }
        } else if utils::is_duration_text(text) {
            hit.duration = Some(text.to_string());
        } else if text == "Song" || text.is_empty() {
            continue;
        } else if hit.album.is_some() && utils::is_year_text(text) {
            // release year follows the album
            continue;
        } else {
            hit.artists.push(Artist {
                name: text.to_string(),
                id: None,
            });
        }
    }
}

fn flex_column_runs(renderer: &Value, column: usize) -> Option<&Vec<Value>> {
    renderer
        .pointer(&format!("/flexColumns/{}/{}", column, FLEX_COLUMN_RUNS))
        .and_then(Value::as_array)
}

fn str_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

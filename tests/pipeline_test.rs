use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;

use harmonize::{
    management::TokenCache,
    observer::{ConversionObserver, ErrorEvent, ProgressEvent},
    pipeline::{ConversionError, Converter, OutputPaths, Stage},
    spotify::{
        auth::{AuthError, Authenticator, TokenProvider},
        playlist::{FetchError, PlaylistFetcher, PlaylistSource},
    },
    types::{
        CatalogHit, PlaylistArtist, PlaylistItem, PlaylistTrack, PlaylistTracksResponse,
        SourceTrack, Thumbnail, TokenResponse,
    },
    ytmusic::{CatalogResolver, CatalogService, SearchError, SearchFilter},
};

struct FakeTokenProvider {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait]
impl TokenProvider for FakeTokenProvider {
    async fn request_token(&self) -> Result<TokenResponse, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AuthError::InvalidResponse("invalid_client".to_string()));
        }
        Ok(TokenResponse {
            access_token: "token".to_string(),
            expires_in: 3600,
            token_type: "Bearer".to_string(),
        })
    }
}

/// Serves `(name, artist)` pairs through limit/offset slicing.
struct FakePlaylistSource {
    tracks: Vec<(String, String)>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl PlaylistSource for FakePlaylistSource {
    async fn tracks_page(
        &self,
        token: &str,
        _playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<PlaylistTracksResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(token, "token");

        let start = (offset as usize).min(self.tracks.len());
        let end = (start + limit as usize).min(self.tracks.len());
        Ok(PlaylistTracksResponse {
            items: self.tracks[start..end]
                .iter()
                .map(|(name, artist)| PlaylistItem {
                    track: Some(PlaylistTrack {
                        name: name.clone(),
                        artists: vec![PlaylistArtist {
                            name: artist.clone(),
                        }],
                    }),
                })
                .collect(),
        })
    }
}

/// Answers known queries with a hit, everything else with no results.
struct FakeCatalog {
    hits: HashMap<String, CatalogHit>,
    queries: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn search(
        &self,
        query: &str,
        filter: SearchFilter,
        limit: usize,
    ) -> Result<Vec<CatalogHit>, SearchError> {
        assert_eq!(filter, SearchFilter::Songs);
        assert_eq!(limit, 1);
        self.queries.lock().unwrap().push(query.to_string());

        if query.starts_with("broken") {
            return Err(SearchError::InvalidResponse("timeout".to_string()));
        }
        Ok(self.hits.get(query).cloned().into_iter().collect())
    }
}

#[derive(Default)]
struct RecordingObserver {
    aborted: Mutex<Vec<String>>,
    searched: AtomicUsize,
}

impl ConversionObserver for RecordingObserver {
    fn on_progress(&self, event: ProgressEvent<'_>) {
        if let ProgressEvent::Searching { .. } = event {
            self.searched.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn on_error(&self, event: ErrorEvent<'_>) {
        if let ErrorEvent::Aborted { error } = event {
            self.aborted.lock().unwrap().push(error.to_string());
        }
    }
}

fn hit(video_id: &str, title: &str) -> CatalogHit {
    CatalogHit {
        video_id: Some(video_id.to_string()),
        title: Some(title.to_string()),
        thumbnails: vec![Thumbnail {
            url: format!("https://i.ytimg.com/vi/{}/hq.jpg", video_id),
            width: Some(120),
            height: Some(90),
        }],
        ..CatalogHit::default()
    }
}

struct Harness {
    dir: TempDir,
    provider_calls: Arc<AtomicUsize>,
    page_calls: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
    tracks: Vec<(String, String)>,
    hits: HashMap<String, CatalogHit>,
    auth_fails: bool,
    output_dir: PathBuf,
}

impl Harness {
    fn new(tracks: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("empty_playlist.json"),
            r#"{"playlistName": "Converted", "isCloudPlaylist": false, "songs": []}"#,
        )
        .unwrap();

        Self {
            dir,
            provider_calls: Arc::new(AtomicUsize::new(0)),
            page_calls: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(Mutex::new(Vec::new())),
            tracks: tracks
                .iter()
                .map(|(n, a)| (n.to_string(), a.to_string()))
                .collect(),
            hits: HashMap::new(),
            auth_fails: false,
            output_dir: PathBuf::new(),
        }
    }

    fn with_hit(mut self, query: &str, video_id: &str, title: &str) -> Self {
        self.hits.insert(query.to_string(), hit(video_id, title));
        self
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn template(&self) -> PathBuf {
        self.path("empty_playlist.json")
    }

    fn output(&self, name: &str) -> PathBuf {
        self.dir.path().join(&self.output_dir).join(name)
    }

    fn converter<'a>(
        &self,
        observer: &'a dyn ConversionObserver,
    ) -> Converter<'a, FakeTokenProvider, FakePlaylistSource, FakeCatalog> {
        let authenticator = Authenticator::new(
            FakeTokenProvider {
                calls: Arc::clone(&self.provider_calls),
                fail: self.auth_fails,
            },
            TokenCache::new(self.path("cache/token.json")),
        );
        let fetcher = PlaylistFetcher::new(FakePlaylistSource {
            tracks: self.tracks.clone(),
            calls: Arc::clone(&self.page_calls),
        })
        .with_page_delay(Duration::ZERO);
        let resolver = CatalogResolver::new(FakeCatalog {
            hits: self.hits.clone(),
            queries: Arc::clone(&self.queries),
        });
        let outputs = OutputPaths {
            playlist: self.output("harmony_playlist.json"),
            failed_tracks: self.output("failed_tracks.json"),
        };

        Converter::new(authenticator, fetcher, resolver, outputs, observer)
    }

    async fn run(
        &self,
        template: &Path,
        observer: &dyn ConversionObserver,
    ) -> Result<harmonize::pipeline::ConversionSummary, ConversionError> {
        let mut converter = self.converter(observer);
        let result = converter.run("playlist", template).await;
        match &result {
            Ok(_) => assert_eq!(converter.stage(), Stage::Finalized),
            Err(_) => assert_eq!(converter.stage(), Stage::Aborted),
        }
        result
    }

    fn read_json(&self, name: &str) -> Value {
        serde_json::from_str(&std::fs::read_to_string(self.path(name)).unwrap()).unwrap()
    }
}

#[tokio::test]
async fn test_one_hit_one_miss() {
    let harness = Harness::new(&[("A", "X"), ("B", "Y")]).with_hit("A X", "v1", "A");
    let observer = RecordingObserver::default();

    let summary = harness.run(&harness.template(), &observer).await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed_count(), 1);
    assert_eq!(summary.to_string(), "1/2 succeeded, 1 failed");

    let playlist = harness.read_json("harmony_playlist.json");
    let songs = playlist["songs"].as_array().unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["videoId"], "v1");
    assert_eq!(songs[0]["title"], "A");
    assert_eq!(playlist["playlistName"], "Converted");

    let failed: Vec<SourceTrack> =
        serde_json::from_value(harness.read_json("failed_tracks.json")).unwrap();
    assert_eq!(
        failed,
        vec![SourceTrack {
            name: "B".to_string(),
            artist: "Y".to_string(),
            query: "B Y".to_string(),
        }]
    );
    assert_eq!(
        harness.read_json("failed_tracks.json")[0],
        json!({"name": "B", "artist": "Y", "query": "B Y"})
    );
}

#[tokio::test]
async fn test_counts_add_up_and_order_is_kept() {
    let names: Vec<(String, String)> = (0..120)
        .map(|i| (format!("Song {}", i), "Band".to_string()))
        .collect();
    let pairs: Vec<(&str, &str)> = names
        .iter()
        .map(|(n, a)| (n.as_str(), a.as_str()))
        .collect();

    let mut harness = Harness::new(&pairs);
    for i in (0..120).filter(|i| i % 3 != 0) {
        harness = harness.with_hit(&format!("Song {} Band", i), &format!("v{}", i), "t");
    }

    let summary = harness
        .run(&harness.template(), &RecordingObserver::default())
        .await
        .unwrap();

    assert_eq!(summary.total, 120);
    assert_eq!(summary.succeeded + summary.failed_count(), summary.total);
    assert_eq!(summary.succeeded, 80);
    assert_eq!(harness.page_calls.load(Ordering::SeqCst), 3);

    let songs = harness.read_json("harmony_playlist.json")["songs"].clone();
    let ids: Vec<String> = songs
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["videoId"].as_str().unwrap().to_string())
        .collect();
    let expected: Vec<String> = (0..120)
        .filter(|i| i % 3 != 0)
        .map(|i| format!("v{}", i))
        .collect();
    assert_eq!(ids, expected);

    let queries = harness.queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 120);
    assert_eq!(queries[0], "Song 0 Band");
    assert_eq!(queries[119], "Song 119 Band");
}

#[tokio::test]
async fn test_songs_have_fixed_schema() {
    let harness = Harness::new(&[("A", "X")]).with_hit("A X", "v1", "A");
    harness
        .run(&harness.template(), &RecordingObserver::default())
        .await
        .unwrap();

    let content = std::fs::read_to_string(harness.path("harmony_playlist.json")).unwrap();
    let playlist: Value = serde_json::from_str(&content).unwrap();
    let song = playlist["songs"][0].as_object().unwrap();

    let keys: Vec<&str> = song.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        [
            "videoId",
            "title",
            "album",
            "artists",
            "length",
            "duration",
            "date",
            "thumbnails",
            "url",
            "trackDetails",
            "year"
        ]
    );
    for key in ["album", "length", "duration", "date", "url", "trackDetails", "year"] {
        assert!(song[key].is_null(), "{} should be null", key);
    }

    // Template keys keep their order
    let top: Vec<&str> = playlist.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(top, ["playlistName", "isCloudPlaylist", "songs"]);
}

#[tokio::test]
async fn test_no_failures_means_no_failure_file() {
    let harness = Harness::new(&[("A", "X")]).with_hit("A X", "v1", "A");
    let summary = harness
        .run(&harness.template(), &RecordingObserver::default())
        .await
        .unwrap();

    assert_eq!(summary.failed_tracks_path, None);
    assert!(!harness.path("failed_tracks.json").exists());
    assert!(summary.playlist_path.is_some());
}

#[tokio::test]
async fn test_zero_successes_still_saves_playlist() {
    let harness = Harness::new(&[("A", "X"), ("broken", "Z")]);
    let summary = harness
        .run(&harness.template(), &RecordingObserver::default())
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed_count(), 2);
    assert_eq!(
        harness.read_json("harmony_playlist.json")["songs"],
        json!([])
    );
    assert_eq!(
        harness.read_json("failed_tracks.json")
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn test_auth_failure_aborts_before_fetching() {
    let mut harness = Harness::new(&[("A", "X")]);
    harness.auth_fails = true;
    let observer = RecordingObserver::default();

    let err = harness.run(&harness.template(), &observer).await.unwrap_err();

    assert!(matches!(err, ConversionError::Auth(_)));
    assert_eq!(harness.page_calls.load(Ordering::SeqCst), 0);
    assert!(!harness.path("harmony_playlist.json").exists());
    assert!(!harness.path("cache/token.json").exists());
    assert_eq!(observer.aborted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_template_aborts_before_fetching() {
    let harness = Harness::new(&[("A", "X")]);
    let observer = RecordingObserver::default();

    let err = harness
        .run(&harness.path("nope.json"), &observer)
        .await
        .unwrap_err();

    assert!(matches!(err, ConversionError::Template(_)));
    assert!(err.to_string().contains("nope.json"));
    assert_eq!(harness.page_calls.load(Ordering::SeqCst), 0);
    assert!(!harness.path("harmony_playlist.json").exists());
}

#[tokio::test]
async fn test_empty_playlist_aborts() {
    let harness = Harness::new(&[]);
    let observer = RecordingObserver::default();

    let err = harness.run(&harness.template(), &observer).await.unwrap_err();

    assert!(matches!(err, ConversionError::NoTracks(_)));
    assert_eq!(observer.searched.load(Ordering::SeqCst), 0);
    assert!(!harness.path("harmony_playlist.json").exists());
}

#[tokio::test]
async fn test_template_without_songs_aborts_on_first_append() {
    let harness = Harness::new(&[("A", "X")]).with_hit("A X", "v1", "A");
    let template = harness.path("bad_template.json");
    std::fs::write(&template, r#"{"playlistName": "Converted"}"#).unwrap();

    let err = harness
        .run(&template, &RecordingObserver::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ConversionError::Template(_)));
    assert!(!harness.path("harmony_playlist.json").exists());
}

#[tokio::test]
async fn test_cached_token_is_reused_across_runs() {
    let harness = Harness::new(&[("A", "X")]).with_hit("A X", "v1", "A");
    let observer = RecordingObserver::default();

    harness.run(&harness.template(), &observer).await.unwrap();
    assert_eq!(harness.provider_calls.load(Ordering::SeqCst), 1);
    assert!(harness.path("cache/token.json").exists());

    harness.run(&harness.template(), &observer).await.unwrap();
    assert_eq!(harness.provider_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_output_directory_is_created() {
    let mut harness = Harness::new(&[("A", "X"), ("B", "Y")]).with_hit("A X", "v1", "A");
    harness.output_dir = PathBuf::from("out/run");

    let summary = harness
        .run(&harness.template(), &RecordingObserver::default())
        .await
        .unwrap();

    assert_eq!(summary.to_string(), "1/2 succeeded, 1 failed");
    assert_eq!(
        summary.playlist_path,
        Some(harness.output("harmony_playlist.json"))
    );
    assert_eq!(
        summary.failed_tracks_path,
        Some(harness.output("failed_tracks.json"))
    );
    assert!(harness.output("harmony_playlist.json").is_file());
    assert!(harness.output("failed_tracks.json").is_file());
}

#[tokio::test]
async fn test_non_ascii_text_is_written_literally() {
    let harness = Harness::new(&[("Für Elise", "Beethoven")]).with_hit(
        "Für Elise Beethoven",
        "v1",
        "Für Elise",
    );

    harness
        .run(&harness.template(), &RecordingObserver::default())
        .await
        .unwrap();

    let content = std::fs::read_to_string(harness.path("harmony_playlist.json")).unwrap();
    assert!(content.contains("\"title\": \"Für Elise\""));
    assert!(!content.contains("\\u00fc"));
}

#[tokio::test]
async fn test_authenticate_before_run_requests_one_token() {
    let harness = Harness::new(&[("A", "X")]).with_hit("A X", "v1", "A");
    let observer = RecordingObserver::default();
    let mut converter = harness.converter(&observer);

    converter.authenticate().await.unwrap();
    assert_eq!(converter.stage(), Stage::Authenticated);
    assert_eq!(harness.page_calls.load(Ordering::SeqCst), 0);

    let summary = converter.run("playlist", &harness.template()).await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(converter.stage(), Stage::Finalized);
    assert_eq!(harness.provider_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_authenticate_failure_aborts() {
    let mut harness = Harness::new(&[("A", "X")]);
    harness.auth_fails = true;
    let observer = RecordingObserver::default();
    let mut converter = harness.converter(&observer);

    let err = converter.authenticate().await.unwrap_err();

    assert!(matches!(err, ConversionError::Auth(_)));
    assert_eq!(converter.stage(), Stage::Aborted);
    assert_eq!(observer.aborted.lock().unwrap().len(), 1);
}

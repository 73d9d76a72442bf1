use crate::{
    observer::{ConversionObserver, ErrorEvent},
    types::{CatalogHit, ResolvedTrack},
    ytmusic::{CatalogService, SearchFilter},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(ResolvedTrack),
    NotFound,
}

impl ResolvedTrack {
    /// A hit counts only with a video id, a title and at least one thumbnail;
    /// Harmony Music cannot play or display a song lacking any of them.
    pub fn from_hit(hit: CatalogHit) -> Option<Self> {
        let id = hit.video_id.filter(|id| !id.is_empty())?;
        let title = hit.title.filter(|title| !title.is_empty())?;
        if hit.thumbnails.is_empty() {
            return None;
        }

        Some(ResolvedTrack {
            id,
            title,
            artists: hit.artists,
            album: hit.album,
            thumbnails: hit.thumbnails,
            duration_text: hit.duration,
        })
    }
}

/// Maps a search query to at most one catalog song.
pub struct CatalogResolver<C> {
    catalog: C,
}

impl<C: CatalogService> CatalogResolver<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Looks `query` up and trusts the catalog's top song.
    ///
    /// Never fails: an empty result, an incomplete top hit and a failed
    /// search all come back as [`Resolution::NotFound`]. Search failures are
    /// still passed to the observer so they can be told apart in the output.
    pub async fn resolve(&self, query: &str, observer: &dyn ConversionObserver) -> Resolution {
        match self.catalog.search(query, SearchFilter::Songs, 1).await {
            Ok(hits) => hits
                .into_iter()
                .next()
                .and_then(ResolvedTrack::from_hit)
                .map_or(Resolution::NotFound, Resolution::Found),
            Err(error) => {
                observer.on_error(ErrorEvent::SearchFailed {
                    query,
                    error: &error,
                });
                Resolution::NotFound
            }
        }
    }
}

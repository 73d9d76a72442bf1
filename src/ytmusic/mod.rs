//! # YouTube Music Integration Module
//!
//! The target catalog of a conversion. Every Spotify track is looked up here
//! with a free-text query, and the top song result becomes the Harmony Music
//! entry.
//!
//! ## Core Modules
//!
//! - [`search`] - HTTP client for the `youtubei/v1/search` endpoint used by
//!   the YouTube Music web client
//! - [`parse`] - Extraction of song rows from the renderer tree the search
//!   endpoint answers with
//! - [`resolve`] - The per-track lookup contract: one search, top result,
//!   [`resolve::Resolution::Found`] or [`resolve::Resolution::NotFound`]
//!
//! No API key or login is needed; the endpoint is queried anonymously with
//! the `WEB_REMIX` client context.

use std::fmt;

use async_trait::async_trait;

use crate::types::CatalogHit;

pub mod parse;
pub mod resolve;
pub mod search;

pub use resolve::{CatalogResolver, Resolution};
pub use search::YtMusicClient;

/// Result type filter applied to a catalog search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFilter {
    Songs,
}

impl SearchFilter {
    /// Protobuf-encoded `params` value the web client sends for the filter.
    pub fn params(&self) -> &'static str {
        match self {
            SearchFilter::Songs => "EgWKAQIIAWoMEA4QChADEAQQCRAF",
        }
    }
}

#[derive(Debug)]
pub enum SearchError {
    RequestError(reqwest::Error),
    InvalidResponse(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::RequestError(err)
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::RequestError(e) => write!(f, "Error searching YouTube Music: {}", e),
            SearchError::InvalidResponse(msg) => {
                write!(f, "Unexpected YouTube Music response: {}", msg)
            }
        }
    }
}

impl std::error::Error for SearchError {}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn search(
        &self,
        query: &str,
        filter: SearchFilter,
        limit: usize,
    ) -> Result<Vec<CatalogHit>, SearchError>;
}

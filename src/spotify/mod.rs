//! # Spotify Integration Module
//!
//! This module is the source side of a conversion: it authenticates against
//! the Spotify Web API and reads the tracks of the playlist being converted.
//!
//! ## Overview
//!
//! ```text
//! Pipeline (Converter)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (Client Credentials, token cache)
//!     └── Playlist Retrieval (offset pagination)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! ### Authentication Module
//!
//! [`auth`] - Implements the OAuth 2.0 Client Credentials flow:
//! - **Token Provider**: [`auth::TokenProvider`] is the seam to the accounts
//!   service; [`auth::SpotifyTokenProvider`] is the HTTP implementation
//! - **Token Reuse**: [`auth::Authenticator`] serves the cached token until it
//!   is within five minutes of expiring
//! - **Fail Fast**: a failed token request is fatal, there is no retry
//!
//! ### Playlist Module
//!
//! [`playlist`] - Reads a playlist's track listing:
//! - **Offset Pagination**: pages of 50 items, stopping on an empty or short
//!   page
//! - **Partial Results**: a failed page ends pagination but keeps everything
//!   fetched before it
//! - **Rate Limiting**: a fixed 100 ms pause between page requests
//! - **Normalization**: every item becomes a [`crate::types::SourceTrack`]
//!   carrying the YouTube Music search query
//!
//! ## API Coverage
//!
//! - `POST /api/token` - Client credentials exchange
//! - `GET /playlists/{playlist_id}/tracks` - Playlist items with `limit`/`offset`
//!
//! ## Configuration Integration
//!
//! Endpoints and credentials come from [`crate::config::Config`]; nothing in
//! this module reads the environment.

pub mod auth;
pub mod playlist;

//! Genius API Data Transfer Objects
//!
//! These types match what the Genius search endpoint returns.
//! DO NOT use these types outside the genius module - convert to domain types.
//!
//! API Reference: https://docs.genius.com/#search-h2
//!
//! Example response (trimmed):
//! ```json
//! {
//!   "meta": { "status": 200 },
//!   "response": {
//!     "hits": [{
//!       "type": "song",
//!       "result": {
//!         "id": 378195,
//!         "title": "Song Title",
//!         "url": "https://genius.com/Artist-song-title-lyrics",
//!         "primary_artist": { "id": 16775, "name": "Artist" }
//!       }
//!     }]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Top-level search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    pub meta: Meta,
    pub response: Option<SearchBody>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Meta {
    pub status: u16,
    /// Present on API errors
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchBody {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// A single search hit
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Hit {
    /// "song" for song results
    #[serde(rename = "type")]
    pub hit_type: String,
    pub result: SongResult,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SongResult {
    pub id: u64,
    pub title: String,
    /// Song page holding the lyrics markup
    pub url: String,
    pub primary_artist: Option<PrimaryArtist>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrimaryArtist {
    pub id: u64,
    pub name: String,
}

//! Trait definitions for the external providers.
//!
//! These traits let stages take any provider, so tests can substitute
//! mock implementations that count calls and replay canned answers.
//!
//! # Example
//!
//! ```ignore
//! use lyric_mood::enrichment::traits::LyricsProvider;
//!
//! async fn lyrics_for<P: LyricsProvider + ?Sized>(provider: &P, song: &SongRecord) {
//!     let text = provider.fetch_lyrics(&song.title, &song.artist).await?;
//! }
//! ```

use async_trait::async_trait;

use super::domain::{LyricsError, SentimentError};
use crate::model::SentimentScore;

/// Lyrics search provider.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Fetch the lyrics for a song.
    async fn fetch_lyrics(&self, title: &str, artist: &str) -> Result<String, LyricsError>;
}

/// Text-classification provider.
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Classify `text` into label/score candidates, highest score first.
    async fn classify(&self, text: &str) -> Result<Vec<SentimentScore>, SentimentError>;
}

// Implement traits for real clients

#[async_trait]
impl LyricsProvider for super::genius::GeniusClient {
    async fn fetch_lyrics(&self, title: &str, artist: &str) -> Result<String, LyricsError> {
        self.fetch_lyrics(title, artist).await
    }
}

#[async_trait]
impl SentimentProvider for super::huggingface::HuggingFaceClient {
    async fn classify(&self, text: &str) -> Result<Vec<SentimentScore>, SentimentError> {
        self.classify(text).await
    }
}

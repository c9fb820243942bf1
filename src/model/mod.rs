//! Core data models for the lyrics pipeline.
//!
//! Defines the record threaded through every stage ([`SongRecord`]), the
//! sentiment candidates attached to it ([`SentimentScore`]), and the row
//! persisted by the result store ([`SongRow`]).
//!
//! # Database Schema
//!
//! [`SongRow`] maps to the single `songs` table:
//! `songs(id PK, title, artist, lyrics, lyrics_clean, sentiment_label,
//! sentiment_score, updated_at)`

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;

/// One label/score candidate returned by the sentiment provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Provider label (e.g. "POSITIVE")
    pub label: String,
    /// Probability in 0.0..=1.0
    pub score: f64,
}

/// A song moving through the pipeline.
///
/// `title` and `artist` are set at ingestion and never mutated. Every other
/// field is owned by exactly one stage; downstream stages only read it.
/// `None` is the explicit absent-marker and serializes to JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    /// Stable external identifier, when the source provides one
    pub id: Option<String>,
    pub title: String,
    pub artist: String,
    /// Raw lyrics, set by the fetch stage
    #[serde(default)]
    pub lyrics: Option<String>,
    /// Normalized lyrics, set by the preprocess stage
    #[serde(default)]
    pub lyrics_clean: Option<String>,
    /// Ordered candidates, highest score first, set by the sentiment stage
    #[serde(default)]
    pub sentiment: Option<Vec<SentimentScore>>,
    /// RFC 3339 timestamp of the sentiment cache write
    #[serde(default)]
    pub cached_at: Option<String>,
}

impl SongRecord {
    /// Create a freshly ingested record.
    pub fn new(id: Option<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            ..Default::default()
        }
    }

    /// Stable identifier, ignoring empty strings.
    pub fn stable_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Identifier used as the result-store primary key.
    ///
    /// Falls back to a digest of artist and title so id-less records still
    /// map to exactly one row.
    pub fn storage_id(&self) -> String {
        match self.stable_id() {
            Some(id) => id.to_string(),
            None => {
                let mut hasher = Sha256::new();
                hasher.update(self.artist.to_lowercase().as_bytes());
                hasher.update([0x1f]);
                hasher.update(self.title.to_lowercase().as_bytes());
                format!("{:x}", hasher.finalize())
            }
        }
    }

    /// The top-ranked sentiment candidate, if any.
    pub fn top_sentiment(&self) -> Option<&SentimentScore> {
        self.sentiment.as_ref().and_then(|s| s.first())
    }

    /// Short human-readable label for log lines.
    pub fn describe(&self) -> String {
        format!("'{}' by '{}'", self.title, self.artist)
    }
}

/// A row in the `songs` table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SongRow {
    /// Primary key
    pub id: String,
    pub title: String,
    pub artist: String,
    pub lyrics: Option<String>,
    pub lyrics_clean: Option<String>,
    pub sentiment_label: Option<String>,
    pub sentiment_score: Option<f64>,
    /// RFC 3339 write timestamp
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_no_stage_fields() {
        let record = SongRecord::new(Some("1".into()), "X", "Y");
        assert_eq!(record.title, "X");
        assert!(record.lyrics.is_none());
        assert!(record.lyrics_clean.is_none());
        assert!(record.sentiment.is_none());
        assert!(record.cached_at.is_none());
    }

    #[test]
    fn test_storage_id_prefers_stable_id() {
        let record = SongRecord::new(Some("abc".into()), "Song", "Artist");
        assert_eq!(record.storage_id(), "abc");
    }

    #[test]
    fn test_storage_id_fallback_is_deterministic_and_case_insensitive() {
        let a = SongRecord::new(None, "Song", "Artist");
        let b = SongRecord::new(Some(String::new()), "SONG", "artist");
        assert_eq!(a.storage_id(), b.storage_id());
        assert_eq!(a.storage_id().len(), 64);

        let other = SongRecord::new(None, "Other Song", "Artist");
        assert_ne!(a.storage_id(), other.storage_id());
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let record = SongRecord::new(None, "X", "Y");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["sentiment"].is_null());
        assert!(json["lyrics_clean"].is_null());
        assert!(json["id"].is_null());
    }

    #[test]
    fn test_top_sentiment() {
        let mut record = SongRecord::new(None, "X", "Y");
        assert!(record.top_sentiment().is_none());

        record.sentiment = Some(vec![
            SentimentScore { label: "POSITIVE".into(), score: 0.9 },
            SentimentScore { label: "NEGATIVE".into(), score: 0.1 },
        ]);
        assert_eq!(record.top_sentiment().unwrap().label, "POSITIVE");
    }
}

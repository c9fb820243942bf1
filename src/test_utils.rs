//! Test utilities and fixtures for lyric-mood tests.
//!
//! Common helpers for temporary stores and canned records, to reduce
//! boilerplate in stage and database tests.
//!
//! # Example
//!
//! ```ignore
//! use lyric_mood::test_utils::{temp_cache, temp_db, mock_enriched_record};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (pool, _db_dir) = temp_db().await;
//!     let (cache, _cache_dir) = temp_cache();
//!     let record = mock_enriched_record("1");
//!     // ... test logic
//! }
//! ```

use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::cache::CacheStore;
use crate::model::{SentimentScore, SongRecord};

/// Raw lyrics with a section header, wrapped lines and punctuation.
///
/// Long enough to survive the normalizer's minimum word count.
pub const SAMPLE_LYRICS: &str = "[Verse 1]\nIs this the real life?\nIs this just fantasy?\n\n[Chorus]\nCaught in a landslide, no escape from reality";

/// Creates a temporary result database for testing.
///
/// The database lives in a temporary directory that is removed when the
/// returned `TempDir` is dropped. Keep the `TempDir` alive for the
/// duration of the test.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("output").join("songs.db");

    let pool = crate::db::init_db(&crate::db::db_url(&db_path))
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// Creates a cache store rooted in a fresh temporary directory.
pub fn temp_cache() -> (CacheStore, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    (CacheStore::new(dir.path()), dir)
}

/// Creates a record that has been through every stage.
///
/// Top sentiment is POSITIVE at 0.9. Customize with struct update syntax:
///
/// ```ignore
/// let custom = SongRecord {
///     title: "Custom".to_string(),
///     ..mock_enriched_record("1")
/// };
/// ```
pub fn mock_enriched_record(id: &str) -> SongRecord {
    SongRecord {
        id: Some(id.to_string()),
        title: format!("Song {}", id),
        artist: "Test Artist".to_string(),
        lyrics: Some(SAMPLE_LYRICS.to_string()),
        lyrics_clean: crate::normalize::normalize(SAMPLE_LYRICS),
        sentiment: Some(vec![
            SentimentScore {
                label: "POSITIVE".to_string(),
                score: 0.9,
            },
            SentimentScore {
                label: "NEGATIVE".to_string(),
                score: 0.1,
            },
        ]),
        cached_at: Some("2024-01-01T00:00:00.000000Z".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Namespace;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        let (pool, _dir) = temp_db().await;

        let songs = crate::db::list_songs(&pool).await.unwrap();
        assert!(songs.is_empty());
    }

    #[test]
    fn test_temp_cache_starts_empty() {
        let (cache, dir) = temp_cache();
        assert_eq!(cache.root(), dir.path());
        for namespace in Namespace::ALL {
            assert_eq!(cache.entry_count(namespace), 0);
        }
    }

    #[test]
    fn test_sample_lyrics_survive_normalization() {
        let clean = crate::normalize::normalize(SAMPLE_LYRICS).unwrap();
        assert!(!clean.contains("verse"));
        assert!(clean.contains("caught in a landslide"));
    }

    #[test]
    fn test_mock_enriched_record_defaults() {
        let record = mock_enriched_record("42");
        assert_eq!(record.stable_id(), Some("42"));
        assert!(record.lyrics_clean.is_some());
        let top = record.top_sentiment().unwrap();
        assert_eq!(top.label, "POSITIVE");
        assert_eq!(top.score, 0.9);
    }
}

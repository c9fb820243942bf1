//! The four-stage enrichment pipeline: fetch → clean → classify → persist.
//!
//! Each stage is a function taking the record plus its collaborators
//! (cache, provider, pool), so every dependency is injected and tests can run
//! against a temporary cache root and mock providers. [`Pipeline`] runs the
//! stages over a batch with bounded concurrency.
//!
//! Recovery is cache-based: a record interrupted between stages resumes from
//! the last stage whose result was cached.

mod driver;
pub mod fetch;
pub mod preprocess;
pub mod sentiment;

pub use driver::{BatchReport, Pipeline, PipelineSettings, RecordOutcome, Stage};

use crate::cache::CacheError;
use crate::enrichment::{LyricsError, SentimentError};

/// Failure of a single stage for a single record.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Lyrics(#[from] LyricsError),

    #[error(transparent)]
    Sentiment(#[from] SentimentError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StageError {
    /// Whether the orchestration layer should run the stage again.
    ///
    /// Only provider faults qualify. Local storage is assumed reliable and a
    /// definite lyrics "not found" will not change on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Lyrics(e) => e.is_retryable(),
            Self::Sentiment(_) => true,
            Self::Cache(_) | Self::Database(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::ProviderFault;

    #[test]
    fn test_retryable_classification() {
        assert!(!StageError::from(LyricsError::not_found("a", "b")).is_retryable());
        assert!(
            StageError::from(LyricsError::provider("a", "b", ProviderFault::RateLimited))
                .is_retryable()
        );
        assert!(StageError::from(SentimentError::EmptyResult).is_retryable());
        assert!(!StageError::from(sqlx::Error::RowNotFound).is_retryable());
    }

    #[test]
    fn test_lyrics_error_message_is_transparent() {
        let err = StageError::from(LyricsError::not_found("Song", "Band"));
        assert_eq!(err.to_string(), "Lyrics not found for 'Song' by 'Band'");
    }
}

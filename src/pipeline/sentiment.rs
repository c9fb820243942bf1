//! Sentiment stage: annotate a record with a label/score distribution.
//!
//! The `sentiment` namespace caches the whole enriched record, not only the
//! scores. On a hit the cached record replaces the input record entirely.

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use super::StageError;
use crate::cache::{CacheStore, Namespace};
use crate::enrichment::SentimentProvider;
use crate::model::SongRecord;
use crate::retry::{self, RetryPolicy};

/// Cache key for the sentiment stage.
///
/// The stable id when there is one, else the SHA-256 hex digest of the
/// cleaned text. Two different cleanings of the same song therefore map to
/// different entries when no id is available.
pub fn cache_key(stable_id: Option<&str>, lyrics_clean: &str) -> String {
    match stable_id {
        Some(id) => id.to_string(),
        None => format!("{:x}", Sha256::digest(lyrics_clean.as_bytes())),
    }
}

/// Classify the cleaned lyrics of `record`.
///
/// Without cleaned lyrics the record comes back with `sentiment` absent and
/// neither the cache nor the provider is touched. Provider calls go through
/// the retry wrapper with `policy`.
pub async fn classify<P>(
    mut record: SongRecord,
    cache: &CacheStore,
    provider: &P,
    policy: RetryPolicy,
) -> Result<SongRecord, StageError>
where
    P: SentimentProvider + ?Sized,
{
    let Some(text) = record.lyrics_clean.clone().filter(|t| !t.is_empty()) else {
        tracing::debug!("No clean lyrics for {}, skipping sentiment", record.describe());
        record.sentiment = None;
        return Ok(record);
    };

    let key = cache_key(record.stable_id(), &text);

    if let Some(cached) = cache.load::<SongRecord>(Namespace::Sentiment, &key) {
        tracing::info!(key = %key, "Cache hit for sentiment");
        return Ok(cached);
    }

    tracing::info!(key = %key, "Cache miss for sentiment");

    let sentiment =
        retry::execute("sentiment inference", policy, || provider.classify(&text)).await?;

    let enriched = SongRecord {
        id: record.id,
        title: record.title,
        artist: record.artist,
        lyrics: record.lyrics,
        lyrics_clean: Some(text),
        sentiment: Some(sentiment),
        cached_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
    };

    cache.save(Namespace::Sentiment, &key, &enriched)?;
    tracing::info!(key = %key, "Sentiment saved to cache");

    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::SentimentError;
    use crate::enrichment::traits::mocks::MockSentiment;
    use crate::model::SentimentScore;
    use crate::test_utils::temp_cache;
    use std::time::Duration;

    fn cleaned(id: Option<&str>, text: &str) -> SongRecord {
        let mut record = SongRecord::new(id.map(str::to_string), "X", "Y");
        record.lyrics = Some(format!("Raw: {}", text));
        record.lyrics_clean = Some(text.to_string());
        record
    }

    fn fast() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_absent_clean_lyrics_short_circuits() {
        let (cache, dir) = temp_cache();
        let provider = MockSentiment::positive(0.9);

        // An entry under the record's key that a cache read would return
        let stale = crate::test_utils::mock_enriched_record("1");
        cache.save(Namespace::Sentiment, "1", &stale).unwrap();
        let entry = dir.path().join("sentiment").join("1.json");
        let before = std::fs::read(&entry).unwrap();

        let record = SongRecord::new(Some("1".into()), "X", "Y");
        let result = classify(record.clone(), &cache, &provider, fast()).await.unwrap();

        assert_eq!(result, record);
        assert_ne!(result, stale);
        assert!(result.sentiment.is_none());
        assert!(result.cached_at.is_none());
        assert_eq!(provider.calls(), 0);
        assert_eq!(cache.entry_count(Namespace::Sentiment), 1);
        assert_eq!(std::fs::read(&entry).unwrap(), before);
    }

    #[tokio::test]
    async fn test_miss_classifies_and_caches_whole_record() {
        let (cache, _dir) = temp_cache();
        let provider = MockSentiment::positive(0.8);

        let record = cleaned(Some("1"), "we are the champions my friend");
        let result = classify(record.clone(), &cache, &provider, fast()).await.unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(provider.texts(), vec!["we are the champions my friend".to_string()]);
        assert_eq!(result.id, record.id);
        assert_eq!(result.lyrics, record.lyrics);
        assert_eq!(result.top_sentiment().unwrap().label, "POSITIVE");
        assert!(result.cached_at.as_deref().unwrap().ends_with('Z'));

        let cached: SongRecord = cache.load(Namespace::Sentiment, "1").unwrap();
        assert_eq!(cached, result);
    }

    #[tokio::test]
    async fn test_hit_returns_cached_record_verbatim() {
        let (cache, _dir) = temp_cache();
        let mut stored = cleaned(Some("1"), "cached text with enough words");
        stored.title = "Cached Title".into();
        stored.sentiment = Some(vec![SentimentScore {
            label: "NEGATIVE".into(),
            score: 0.7,
        }]);
        stored.cached_at = Some("2024-01-01T00:00:00.000000Z".into());
        cache.save(Namespace::Sentiment, "1", &stored).unwrap();

        let provider = MockSentiment::positive(0.9);
        let record = cleaned(Some("1"), "different text entirely for this one");
        let result = classify(record, &cache, &provider, fast()).await.unwrap();

        assert_eq!(result, stored);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_content_hash_key_without_id() {
        let (cache, _dir) = temp_cache();
        let provider = MockSentiment::positive(0.6);
        let text = "no id here but plenty of words";

        classify(cleaned(None, text), &cache, &provider, fast()).await.unwrap();
        classify(cleaned(None, text), &cache, &provider, fast()).await.unwrap();

        assert_eq!(provider.calls(), 1);
        assert!(cache.contains(Namespace::Sentiment, &cache_key(None, text)));
    }

    #[tokio::test]
    async fn test_transient_provider_failures_are_retried() {
        let (cache, _dir) = temp_cache();
        let provider = MockSentiment::positive(0.9).flaky(2);

        let result = classify(cleaned(Some("1"), "a b c d e"), &cache, &provider, fast())
            .await
            .unwrap();

        assert_eq!(provider.calls(), 3);
        assert!(result.sentiment.is_some());
    }

    #[tokio::test]
    async fn test_exhausted_retries_propagate_and_cache_nothing() {
        let (cache, _dir) = temp_cache();
        let provider = MockSentiment::with_error(SentimentError::EmptyResult);

        let err = classify(cleaned(Some("1"), "a b c d e"), &cache, &provider, fast())
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::Sentiment(SentimentError::EmptyResult)));
        assert_eq!(provider.calls(), 3);
        assert!(!cache.contains(Namespace::Sentiment, "1"));
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key(Some("42"), "whatever"), "42");

        let hashed = cache_key(None, "some text");
        assert_eq!(hashed.len(), 64);
        assert_eq!(hashed, cache_key(None, "some text"));
        assert_ne!(hashed, cache_key(None, "some text "));
    }
}

//! Preprocess stage: fill `lyrics_clean` from the cache or the normalizer.

use serde::{Deserialize, Serialize};

use super::StageError;
use crate::cache::{CacheStore, Namespace};
use crate::model::SongRecord;
use crate::normalize::normalize;

/// Cached document for the `preprocessed` namespace.
///
/// `None` is a remembered "too short" verdict, not a miss.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PreprocessedDoc {
    lyrics_clean: Option<String>,
}

/// Normalize the lyrics of `record`.
///
/// Missing raw lyrics leave `lyrics_clean` absent and write nothing.
pub fn preprocess(mut record: SongRecord, cache: &CacheStore) -> Result<SongRecord, StageError> {
    let key = record.stable_id().map(str::to_string);

    if let Some(ref key) = key
        && let Some(doc) = cache.load::<PreprocessedDoc>(Namespace::Preprocessed, key)
    {
        tracing::info!(id = %key, "Cache hit (preprocess)");
        record.lyrics_clean = doc.lyrics_clean;
        return Ok(record);
    }

    tracing::info!("Cache miss (preprocess), cleaning lyrics for {}", record.describe());

    let Some(lyrics) = record.lyrics.as_deref() else {
        tracing::warn!("No lyrics found for {}", record.describe());
        record.lyrics_clean = None;
        return Ok(record);
    };

    let lyrics_clean = normalize(lyrics);
    if lyrics_clean.is_none() {
        tracing::warn!("Lyrics too short for {}", record.describe());
    }

    if let Some(ref key) = key {
        cache.save(
            Namespace::Preprocessed,
            key,
            &PreprocessedDoc {
                lyrics_clean: lyrics_clean.clone(),
            },
        )?;
        tracing::info!(id = %key, "Cached preprocessed lyrics");
    }

    record.lyrics_clean = lyrics_clean;
    Ok(record)
}

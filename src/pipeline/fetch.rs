//! Lyrics stage: fill `lyrics` from the cache or the lyrics provider.

use serde::{Deserialize, Serialize};

use super::StageError;
use crate::cache::{CacheStore, Namespace};
use crate::enrichment::LyricsProvider;
use crate::model::SongRecord;

/// Cached document for the `lyrics` namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LyricsDoc {
    lyrics: String,
}

/// Fetch lyrics for `record`.
///
/// Checks the `lyrics` namespace first (keyed by stable id) and writes back
/// after a successful provider call. Records without a stable id are always
/// fetched and never cached. Provider errors are returned as-is; retrying is
/// the caller's job.
pub async fn fetch_lyrics<P>(
    mut record: SongRecord,
    cache: &CacheStore,
    provider: &P,
) -> Result<SongRecord, StageError>
where
    P: LyricsProvider + ?Sized,
{
    let key = record.stable_id().map(str::to_string);

    if let Some(ref key) = key
        && let Some(doc) = cache.load::<LyricsDoc>(Namespace::Lyrics, key)
    {
        tracing::info!(id = %key, "Cache hit (lyrics), skipping API call");
        record.lyrics = Some(doc.lyrics);
        return Ok(record);
    }

    tracing::info!(
        id = key.as_deref().unwrap_or("-"),
        "Cache miss, fetching lyrics for {}",
        record.describe()
    );

    let lyrics = provider
        .fetch_lyrics(&record.title, &record.artist)
        .await
        .inspect_err(|e| tracing::error!(id = key.as_deref().unwrap_or("-"), "{}", e))?;

    if let Some(ref key) = key {
        cache.save(
            Namespace::Lyrics,
            key,
            &LyricsDoc {
                lyrics: lyrics.clone(),
            },
        )?;
        tracing::info!(id = %key, "Fetched and cached lyrics");
    }

    record.lyrics = Some(lyrics);
    Ok(record)
}

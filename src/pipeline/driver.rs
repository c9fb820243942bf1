//! Batch driver - runs the stages over many songs with bounded fan-out.
//!
//! Records are independent: a record whose retries run out is reported as
//! failed and skips the remaining stages, while every other record carries on.

use std::fmt;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use sqlx::sqlite::SqlitePool;

use super::{StageError, fetch, preprocess, sentiment};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::db::{self, StoreOutcome};
use crate::enrichment::{LyricsProvider, SentimentProvider};
use crate::model::SongRecord;
use crate::retry::{self, RetryPolicy};

/// Pipeline stage, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Preprocess,
    Sentiment,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetch => "fetch",
            Self::Preprocess => "preprocess",
            Self::Sentiment => "sentiment",
            Self::Load => "load",
        })
    }
}

/// Execution settings for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Retry budget for each sentiment inference call
    pub provider_policy: RetryPolicy,
    /// Retry budget for a record's fetch stage
    pub task_policy: RetryPolicy,
    /// Records in flight at once
    pub concurrency: usize,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            provider_policy: config.retry.provider_policy(),
            task_policy: config.retry.task_policy(),
            concurrency: config.pipeline.concurrency,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Final state of one record.
#[derive(Debug)]
pub enum RecordOutcome {
    /// The record reached the result store
    Stored {
        record: SongRecord,
        outcome: StoreOutcome,
    },
    /// A stage gave up on the record
    Failed {
        record: SongRecord,
        stage: Stage,
        error: StageError,
    },
}

/// Per-record results of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl BatchReport {
    /// Records written for the first time in this run.
    pub fn inserted(&self) -> usize {
        self.count_stored(StoreOutcome::Inserted)
    }

    /// Records whose row already existed.
    pub fn already_present(&self) -> usize {
        self.count_stored(StoreOutcome::AlreadyPresent)
    }

    /// Stored records that carry no sentiment (missing or too-short lyrics).
    pub fn without_sentiment(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(o, RecordOutcome::Stored { record, .. } if record.sentiment.is_none())
            })
            .count()
    }

    /// Records that failed, with the stage they failed in.
    pub fn failures(&self) -> impl Iterator<Item = (&SongRecord, Stage, &StageError)> {
        self.outcomes.iter().filter_map(|o| match o {
            RecordOutcome::Failed {
                record,
                stage,
                error,
            } => Some((record, *stage, error)),
            RecordOutcome::Stored { .. } => None,
        })
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    fn count_stored(&self, wanted: StoreOutcome) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RecordOutcome::Stored { outcome, .. } if *outcome == wanted))
            .count()
    }
}

/// The enrichment pipeline with its collaborators.
pub struct Pipeline {
    cache: CacheStore,
    lyrics: Arc<dyn LyricsProvider>,
    sentiment: Arc<dyn SentimentProvider>,
    pool: SqlitePool,
    settings: PipelineSettings,
}

impl Pipeline {
    /// Create a pipeline with default settings.
    pub fn new(
        cache: CacheStore,
        lyrics: Arc<dyn LyricsProvider>,
        sentiment: Arc<dyn SentimentProvider>,
        pool: SqlitePool,
    ) -> Self {
        Self {
            cache,
            lyrics,
            sentiment,
            pool,
            settings: PipelineSettings::default(),
        }
    }

    /// Replace the execution settings.
    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Run every song through all stages.
    ///
    /// Never fails as a whole; per-record failures are in the report.
    pub async fn run(&self, songs: Vec<SongRecord>) -> BatchReport {
        let total = songs.len();
        tracing::info!(
            total,
            concurrency = self.settings.concurrency,
            "Starting lyrics pipeline"
        );

        let mut results: Vec<(usize, RecordOutcome)> = stream::iter(songs.into_iter().enumerate())
            .map(|(index, song)| async move { (index, self.process(song).await) })
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await;

        results.sort_by_key(|(index, _)| *index);
        let report = BatchReport {
            outcomes: results.into_iter().map(|(_, outcome)| outcome).collect(),
        };

        tracing::info!(
            total,
            inserted = report.inserted(),
            already_present = report.already_present(),
            failed = report.failed(),
            "Lyrics pipeline finished"
        );
        report
    }

    /// Run one song through all stages.
    pub async fn process(&self, song: SongRecord) -> RecordOutcome {
        let fetched = retry::execute_if(
            "fetch lyrics",
            self.settings.task_policy,
            || fetch::fetch_lyrics(song.clone(), &self.cache, self.lyrics.as_ref()),
            StageError::is_retryable,
        )
        .await;
        let record = match fetched {
            Ok(record) => record,
            Err(error) => return fail(song, Stage::Fetch, error),
        };

        let record = match preprocess::preprocess(record.clone(), &self.cache) {
            Ok(record) => record,
            Err(error) => return fail(record, Stage::Preprocess, error),
        };

        let record = match sentiment::classify(
            record.clone(),
            &self.cache,
            self.sentiment.as_ref(),
            self.settings.provider_policy,
        )
        .await
        {
            Ok(record) => record,
            Err(error) => return fail(record, Stage::Sentiment, error),
        };

        match db::store_song(&self.pool, &record).await {
            Ok(outcome) => RecordOutcome::Stored { record, outcome },
            Err(error) => fail(record, Stage::Load, error.into()),
        }
    }
}

fn fail(record: SongRecord, stage: Stage, error: StageError) -> RecordOutcome {
    tracing::error!(
        id = record.stable_id().unwrap_or("-"),
        title = %record.title,
        artist = %record.artist,
        %stage,
        "Record failed: {}",
        error
    );
    RecordOutcome::Failed {
        record,
        stage,
        error,
    }
}

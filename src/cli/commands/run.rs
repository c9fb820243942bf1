//! The full enrichment run.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::cache::CacheStore;
use crate::config::{Config, Secrets};
use crate::db;
use crate::enrichment::{LyricsProvider, SentimentProvider};
use crate::error::ResultExt;
use crate::metadata;
use crate::model::SongRecord;
use crate::pipeline::{BatchReport, Pipeline, PipelineSettings};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct RunOverrides {
    pub metadata: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub db: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub genius_token: Option<String>,
    pub hf_token: Option<String>,
}

/// Run the pipeline over every song in the metadata file.
///
/// Missing secrets and unreadable metadata abort before any song is touched.
pub fn cmd_run(rt: &Runtime, config: &Config, overrides: RunOverrides) -> anyhow::Result<()> {
    let secrets =
        config.resolve_secrets(overrides.genius_token.as_deref(), overrides.hf_token.as_deref())?;

    let metadata_path = overrides
        .metadata
        .unwrap_or_else(|| config.paths.metadata.clone());
    let songs = metadata::load(&metadata_path)
        .with_context(format!("Loading {}", metadata_path.display()))?;

    let mut settings = PipelineSettings::from_config(config);
    if let Some(concurrency) = overrides.concurrency {
        settings.concurrency = concurrency;
    }

    let cache_root = overrides
        .cache_dir
        .unwrap_or_else(|| config.paths.cache_root.clone());
    let db_path = overrides
        .db
        .unwrap_or_else(|| config.paths.database.clone());

    println!("Enriching {} songs from {:?}", songs.len(), metadata_path);

    let report = rt.block_on(run_pipeline(
        config,
        &secrets,
        settings,
        CacheStore::new(cache_root),
        db_path,
        songs,
    ))?;

    print_summary(&report);
    Ok(())
}

async fn run_pipeline(
    config: &Config,
    secrets: &Secrets,
    settings: PipelineSettings,
    cache: CacheStore,
    db_path: PathBuf,
    songs: Vec<SongRecord>,
) -> anyhow::Result<BatchReport> {
    let pool = db::init_db(&db::db_url(&db_path))
        .await
        .with_context(format!("Opening result store {}", db_path.display()))?;

    let classifier = config.sentiment.client(&secrets.huggingface_token);
    tracing::info!(model = classifier.model(), "Using sentiment model");

    let lyrics: Arc<dyn LyricsProvider> = Arc::new(config.lyrics.client(&secrets.genius_token));
    let sentiment: Arc<dyn SentimentProvider> = Arc::new(classifier);

    let pipeline = Pipeline::new(cache, lyrics, sentiment, pool.clone()).with_settings(settings);
    let report = pipeline.run(songs).await;

    let stored = db::count_songs(&pool).await.with_context("Counting stored songs")?;
    println!("Result store now holds {} songs", stored);

    pool.close().await;
    Ok(report)
}

fn print_summary(report: &BatchReport) {
    println!();
    println!("Run complete:");
    println!("  Inserted:          {}", report.inserted());
    println!("  Already present:   {}", report.already_present());
    println!("  Without sentiment: {}", report.without_sentiment());
    println!("  Failed:            {}", report.failed());

    if report.failed() > 0 {
        println!();
        for (record, stage, error) in report.failures() {
            println!("  ✗ {} [{}]: {}", record.describe(), stage, error);
        }
    }
}

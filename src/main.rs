//! Lyric Mood - enriches song metadata with lyrics and sentiment.
//!
//! Songs listed in a JSON metadata file are run through four stages: fetch
//! lyrics, normalize the text, classify its sentiment, and store the result
//! in SQLite. Every stage caches its output on disk so a re-run resumes
//! where the last one stopped.

pub mod cache;
pub mod cli;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod metadata;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod retry;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("lyric_mood=info".parse()?))
        .init();

    cli::run_command(args)
}

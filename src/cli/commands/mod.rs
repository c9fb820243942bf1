//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `run`: The full enrichment pipeline over a metadata file
//! - `clean`: The text normalizer on its own
//! - `inspect`: Result store views, cache statistics and config setup

mod clean;
mod inspect;
mod run;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config;

pub use clean::cmd_clean;
pub use inspect::{cmd_cache_stats, cmd_init_config, cmd_list, cmd_show};
pub use run::{RunOverrides, cmd_run};

/// Lyric Mood CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the OS config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch lyrics, classify sentiment and store every song in a metadata file
    Run {
        /// JSON metadata file (array of {id, title, artist})
        #[arg(short, long)]
        metadata: Option<PathBuf>,
        /// Root of the stage cache
        #[arg(long)]
        cache_dir: Option<PathBuf>,
        /// Result database path
        #[arg(long)]
        db: Option<PathBuf>,
        /// Songs processed concurrently
        #[arg(long)]
        concurrency: Option<usize>,
        /// Genius API token (or set GENIUS_TOKEN env var)
        #[arg(long, env = "GENIUS_TOKEN", hide_env_values = true)]
        genius_token: Option<String>,
        /// Hugging Face token (or set HF_TOKEN env var)
        #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
        hf_token: Option<String>,
    },
    /// Normalize lyrics from a file (or stdin) and print the result
    Clean {
        /// Lyrics file; reads stdin when omitted
        path: Option<PathBuf>,
    },
    /// List stored songs
    List {
        /// Result database path
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Show one stored song
    Show {
        /// Song identifier
        id: String,
        /// Result database path
        #[arg(long)]
        db: Option<PathBuf>,
        /// Root of the stage cache
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
    /// Show the number of cached entries per stage
    CacheStats {
        /// Root of the stage cache
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Run {
            metadata,
            cache_dir,
            db,
            concurrency,
            genius_token,
            hf_token,
        } => {
            let rt = Runtime::new()?;
            let config = config::load(config_file);
            cmd_run(
                &rt,
                &config,
                RunOverrides {
                    metadata,
                    cache_dir,
                    db,
                    concurrency,
                    genius_token,
                    hf_token,
                },
            )
        }
        Commands::Clean { path } => cmd_clean(path.as_deref()),
        Commands::List { db } => {
            let rt = Runtime::new()?;
            let config = config::load(config_file);
            cmd_list(&rt, &db.unwrap_or(config.paths.database))
        }
        Commands::Show { id, db, cache_dir } => {
            let rt = Runtime::new()?;
            let config = config::load(config_file);
            cmd_show(
                &rt,
                &db.unwrap_or(config.paths.database),
                &cache_dir.unwrap_or(config.paths.cache_root),
                &id,
            )
        }
        Commands::CacheStats { cache_dir } => {
            let config = config::load(config_file);
            cmd_cache_stats(&cache_dir.unwrap_or(config.paths.cache_root))
        }
        Commands::InitConfig { force } => cmd_init_config(config_file, force),
    }
}

//! Command-line interface for lyric-mood.
//!
//! Runs the enrichment pipeline and offers small inspection commands for
//! the normalizer, the result store and the stage cache.

mod commands;

pub use commands::{Cli, Commands, run_command};

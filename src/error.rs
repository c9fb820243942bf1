//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while
//! the CLI uses `anyhow` for convenient error propagation.
//!
//! - [`Error`]: Top-level error enum for setup and batch-level failures
//! - Module errors ([`MetadataError`], [`ConfigError`], ...) for detailed
//!   handling; per-record stage failures stay in the batch report
//!
//! # Example
//!
//! ```ignore
//! use lyric_mood::error::{Result, ResultExt};
//!
//! async fn open(path: &Path) -> Result<SqlitePool> {
//!     let pool = db::init_db(&db::db_url(path)).await.with_context("opening result store")?;
//!     Ok(pool)
//! }
//! ```

use crate::config::ConfigError;
use crate::metadata::MetadataError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Result store error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Song metadata could not be loaded
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Configuration or secrets error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().context(ctx))
    }
}

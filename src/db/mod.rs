//! Result store for enriched songs.
//!
//! Uses SQLx with SQLite. One row per song identifier, written at most once:
//! a second store of the same identifier leaves the first row untouched,
//! which makes re-running the pipeline safe.
//!
//! # Example
//!
//! ```ignore
//! use lyric_mood::db::{init_db, store_song};
//!
//! let pool = init_db("sqlite:data/output/songs.db").await?;
//! let outcome = store_song(&pool, &record).await?;
//! ```

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::model::{SongRecord, SongRow};

/// Default database path.
pub const DEFAULT_DB_PATH: &str = "data/output/songs.db";

const CREATE_SONGS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS songs (
        id TEXT PRIMARY KEY,
        title TEXT,
        artist TEXT,
        lyrics TEXT,
        lyrics_clean TEXT,
        sentiment_label TEXT,
        sentiment_score REAL,
        updated_at TEXT
    )
"#;

/// What [`store_song`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// A new row was written
    Inserted,
    /// A row with this identifier already existed and was left unchanged
    AlreadyPresent,
}

/// Build a SQLite database URL from a file path.
pub fn db_url(path: &Path) -> String {
    format!("sqlite:{}", path.display())
}

/// Initialize the database connection pool and ensure the schema exists.
///
/// Creates the parent directory and database file if they don't exist.
///
/// # Errors
///
/// Returns an error if:
/// - Database creation fails
/// - Connection cannot be established
/// - Schema creation fails
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = db_url
        .strip_prefix("sqlite:")
        .map(Path::new)
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }

    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    ensure_schema(&pool).await?;

    Ok(pool)
}

/// Create the `songs` table if it is missing.
pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(CREATE_SONGS_TABLE).execute(pool).await?;
    Ok(())
}

/// Store an enriched record, unless a row for its identifier already exists.
///
/// The primary key decides between concurrent first writers
/// (`ON CONFLICT DO NOTHING`), so there is no read-then-write window.
/// Only the top-ranked sentiment candidate is kept; absent sentiment stores
/// NULL label and score.
pub async fn store_song(pool: &SqlitePool, record: &SongRecord) -> sqlx::Result<StoreOutcome> {
    ensure_schema(pool).await?;

    let id = record.storage_id();
    let top = record.top_sentiment();
    let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

    let result = sqlx::query(
        r#"
        INSERT INTO songs
            (id, title, artist, lyrics, lyrics_clean, sentiment_label, sentiment_score, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(&id)
    .bind(&record.title)
    .bind(&record.artist)
    .bind(&record.lyrics)
    .bind(&record.lyrics_clean)
    .bind(top.map(|s| s.label.as_str()))
    .bind(top.map(|s| s.score))
    .bind(&updated_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        tracing::info!(id = %id, "Song already stored, skipping insert");
        Ok(StoreOutcome::AlreadyPresent)
    } else {
        tracing::info!(id = %id, "Stored song {}", record.describe());
        Ok(StoreOutcome::Inserted)
    }
}

/// Get a single stored song by identifier.
pub async fn get_song(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<SongRow>> {
    sqlx::query_as::<_, SongRow>(
        r#"
        SELECT id, title, artist, lyrics, lyrics_clean, sentiment_label, sentiment_score, updated_at
        FROM songs WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Get every stored song, ordered by artist then title.
pub async fn list_songs(pool: &SqlitePool) -> sqlx::Result<Vec<SongRow>> {
    sqlx::query_as::<_, SongRow>(
        r#"
        SELECT id, title, artist, lyrics, lyrics_clean, sentiment_label, sentiment_score, updated_at
        FROM songs ORDER BY artist, title
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Number of stored songs.
pub async fn count_songs(pool: &SqlitePool) -> sqlx::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

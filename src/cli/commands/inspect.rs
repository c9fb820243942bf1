//! Read-only views of the result store and cache, plus config setup.

use std::path::Path;
use tokio::runtime::Runtime;

use crate::cache::{CacheStore, Namespace};
use crate::config::{self, Config};
use crate::db;
use crate::error::ResultExt;

/// List all songs in the result store
pub fn cmd_list(rt: &Runtime, db_path: &Path) -> anyhow::Result<()> {
    if !db_path.exists() {
        println!("No result store at {:?}", db_path);
        return Ok(());
    }

    rt.block_on(print_songs(db_path))
}

async fn print_songs(db_path: &Path) -> anyhow::Result<()> {
    let pool = db::init_db(&db::db_url(db_path))
        .await
        .with_context(format!("Opening result store {}", db_path.display()))?;
    let songs = db::list_songs(&pool).await.with_context("Listing songs")?;

    for song in &songs {
        let mood = match (&song.sentiment_label, song.sentiment_score) {
            (Some(label), Some(score)) => format!("{} ({:.3})", label, score),
            _ => "-".to_string(),
        };
        println!("{}\t{} - {}\t{}", song.id, song.artist, song.title, mood);
    }
    println!("{} songs", songs.len());

    pool.close().await;
    Ok(())
}

/// Show one stored song and which stages have it cached
pub fn cmd_show(rt: &Runtime, db_path: &Path, cache_root: &Path, id: &str) -> anyhow::Result<()> {
    if !db_path.exists() {
        println!("No result store at {:?}", db_path);
        return Ok(());
    }

    rt.block_on(print_song(db_path, &CacheStore::new(cache_root), id))
}

async fn print_song(db_path: &Path, cache: &CacheStore, id: &str) -> anyhow::Result<()> {
    let pool = db::init_db(&db::db_url(db_path))
        .await
        .with_context(format!("Opening result store {}", db_path.display()))?;
    let song = db::get_song(&pool, id)
        .await
        .with_context(format!("Loading song {}", id))?;
    pool.close().await;

    let Some(song) = song else {
        println!("No song with id {}", id);
        return Ok(());
    };

    println!("Id:        {}", song.id);
    println!("Title:     {}", song.title);
    println!("Artist:    {}", song.artist);
    println!("Updated:   {}", song.updated_at);
    match (&song.sentiment_label, song.sentiment_score) {
        (Some(label), Some(score)) => println!("Sentiment: {} ({:.3})", label, score),
        _ => println!("Sentiment: -"),
    }
    println!(
        "Clean:     {}",
        song.lyrics_clean.as_deref().unwrap_or("<too short or missing>")
    );

    let cached: Vec<_> = Namespace::ALL
        .into_iter()
        .filter(|ns| cache.contains(*ns, id))
        .map(|ns| ns.as_str())
        .collect();
    println!(
        "Cached:    {}",
        if cached.is_empty() {
            "-".to_string()
        } else {
            cached.join(", ")
        }
    );
    Ok(())
}

/// Show entry counts per cache namespace
pub fn cmd_cache_stats(cache_root: &Path) -> anyhow::Result<()> {
    let cache = CacheStore::new(cache_root);

    println!("Cache at {:?}", cache.root());
    for namespace in Namespace::ALL {
        println!("  {:<14}{}", namespace.as_str(), cache.entry_count(namespace));
    }
    Ok(())
}

/// Write a default config file at `path`, or the OS default location
pub fn cmd_init_config(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let Some(path) = path.map(Path::to_path_buf).or_else(config::config_path) else {
        anyhow::bail!("Could not determine config directory; pass --config");
    };

    if path.exists() && !force {
        anyhow::bail!("{:?} already exists (use --force to overwrite)", path);
    }

    config::save(&Config::default(), &path).with_context("Writing default config")?;
    println!("Wrote default config to {:?}", path);
    Ok(())
}

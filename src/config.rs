//! Configuration system using TOML files.
//!
//! Config is looked up at an explicit path (`--config`) or in the
//! OS-standard config directory:
//! - Windows: %APPDATA%\lyric-mood\config.toml
//! - macOS: ~/Library/Application Support/lyric-mood/config.toml
//! - Linux: ~/.config/lyric-mood/config.toml
//!
//! A missing or unparsable file falls back to defaults. Credentials may also
//! come from the command line or environment; those take precedence.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::enrichment::genius::{self, GeniusClient};
use crate::enrichment::huggingface::{self, HuggingFaceClient};
use crate::retry::RetryPolicy;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials
    pub credentials: Credentials,

    /// Filesystem locations
    pub paths: PathsConfig,

    /// Retry budgets
    pub retry: RetryConfig,

    /// Batch execution settings
    pub pipeline: PipelineConfig,

    /// Lyrics provider settings
    pub lyrics: LyricsConfig,

    /// Sentiment provider settings
    pub sentiment: SentimentConfig,
}

/// API credentials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Genius API access token
    pub genius_token: Option<String>,
    /// Hugging Face inference token
    pub huggingface_token: Option<String>,
}

/// Filesystem locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the namespaced stage cache
    pub cache_root: PathBuf,
    /// SQLite result database
    pub database: PathBuf,
    /// JSON metadata source
    pub metadata: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_root: PathBuf::from("data/cache"),
            database: PathBuf::from(crate::db::DEFAULT_DB_PATH),
            metadata: PathBuf::from("data/raw/songs_metadata.json"),
        }
    }
}

/// Retry budgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts for a single sentiment inference call
    pub provider_max_attempts: u32,
    /// Pause between inference attempts (ms)
    pub provider_delay_ms: u64,
    /// Attempts for a whole stage of one record
    pub task_max_attempts: u32,
    /// Pause between stage attempts (ms)
    pub task_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            provider_max_attempts: 3,
            provider_delay_ms: 2000,
            task_max_attempts: 4,
            task_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    /// Policy for individual provider calls
    pub fn provider_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.provider_max_attempts,
            Duration::from_millis(self.provider_delay_ms),
        )
    }

    /// Policy for per-record stage retries
    pub fn task_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.task_max_attempts,
            Duration::from_millis(self.task_delay_ms),
        )
    }
}

/// Batch execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Records processed concurrently
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Lyrics provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    /// Genius API root
    pub endpoint: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Strip `[Verse]`-style headers from fetched lyrics
    pub remove_section_headers: bool,
    /// Minimum pause between Genius requests (ms)
    pub sleep_time_ms: u64,
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            endpoint: genius::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 10,
            remove_section_headers: true,
            sleep_time_ms: genius::DEFAULT_SLEEP_TIME.as_millis() as u64,
        }
    }
}

impl LyricsConfig {
    /// Build a Genius client from these settings.
    pub fn client(&self, token: &str) -> GeniusClient {
        GeniusClient::with_base_url(token, &self.endpoint, Duration::from_secs(self.timeout_secs))
            .remove_section_headers(self.remove_section_headers)
            .sleep_time(Duration::from_millis(self.sleep_time_ms))
    }
}

/// Sentiment provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Inference endpoint root
    pub endpoint: String,
    /// Model identifier
    pub model: String,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            endpoint: huggingface::DEFAULT_ENDPOINT.to_string(),
            model: huggingface::DEFAULT_MODEL.to_string(),
        }
    }
}

impl SentimentConfig {
    /// Build a Hugging Face client from these settings.
    pub fn client(&self, token: &str) -> HuggingFaceClient {
        HuggingFaceClient::with_endpoint(token, &self.endpoint, &self.model)
    }
}

/// Both provider tokens, resolved before any record is processed.
#[derive(Debug, Clone, PartialEq)]
pub struct Secrets {
    pub genius_token: String,
    pub huggingface_token: String,
}

impl Config {
    /// Resolve provider tokens, preferring explicit overrides over the file.
    pub fn resolve_secrets(
        &self,
        genius_override: Option<&str>,
        huggingface_override: Option<&str>,
    ) -> Result<Secrets, ConfigError> {
        let pick = |over: Option<&str>, stored: &Option<String>, name: &'static str| {
            over.map(str::to_string)
                .or_else(|| stored.clone())
                .filter(|t| !t.trim().is_empty())
                .ok_or(ConfigError::MissingSecret(name))
        };

        Ok(Secrets {
            genius_token: pick(genius_override, &self.credentials.genius_token, "genius_token")?,
            huggingface_token: pick(
                huggingface_override,
                &self.credentials.huggingface_token,
                "huggingface_token",
            )?,
        })
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lyric-mood"))
}

/// Get the full path to the default config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from `path`, or the default location when `None`.
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load(path: Option<&Path>) -> Config {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to `path`
///
/// Creates the parent directory if it doesn't exist.
pub fn save(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing secret '{0}': set it in the config file, command line or environment")]
    MissingSecret(&'static str),

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

//! Namespaced JSON disk cache.
//!
//! Every pipeline stage checks here before doing external work and writes
//! back on success. Layout on disk:
//!
//! ```text
//! <root>/lyrics/<key>.json
//! <root>/preprocessed/<key>.json
//! <root>/sentiment/<key>.json
//! ```
//!
//! Entries never expire. A file that cannot be read or parsed is reported
//! as a miss so a poisoned entry only costs a recomputation.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

/// Logical partition of the cache, one per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Lyrics,
    Preprocessed,
    Sentiment,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Self::Lyrics, Self::Preprocessed, Self::Sentiment];

    /// Directory name under the cache root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lyrics => "lyrics",
            Self::Preprocessed => "preprocessed",
            Self::Sentiment => "sentiment",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage failures. Parse failures are never reported here.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to create cache directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize cache document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write cache entry {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

/// Unique suffix for temp files written by this process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// JSON document cache rooted at a configurable directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Create a cache rooted at `root`. Directories are created lazily on save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the cache.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `document` under `(namespace, key)`, replacing any previous entry.
    ///
    /// The document is written to a temp file and renamed into place, so a
    /// concurrent reader sees either the old entry or the new one.
    pub fn save<T: Serialize + ?Sized>(
        &self,
        namespace: Namespace,
        key: &str,
        document: &T,
    ) -> Result<(), CacheError> {
        let dir = self.namespace_dir(namespace);
        fs::create_dir_all(&dir).map_err(|e| CacheError::CreateDir(dir.clone(), e))?;

        let contents = serde_json::to_vec(document)?;
        let path = self.entry_path(namespace, key);

        let temp_path = dir.join(format!(
            ".{}.{}.{}.tmp",
            file_stem(key),
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&temp_path, &contents).map_err(|e| CacheError::Write(temp_path.clone(), e))?;
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(CacheError::Rename(temp_path, path, e));
        }

        tracing::debug!(%namespace, key, "Cache entry saved");
        Ok(())
    }

    /// Load the document stored under `(namespace, key)`.
    ///
    /// Returns `None` when there is no entry or the entry is unreadable.
    pub fn load<T: DeserializeOwned>(&self, namespace: Namespace, key: &str) -> Option<T> {
        let path = self.entry_path(namespace, key);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(%namespace, key, "Unreadable cache entry {:?}: {}", path, e);
                return None;
            }
        };

        match serde_json::from_slice(&data) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!(%namespace, key, "Ignoring corrupted cache entry {:?}: {}", path, e);
                None
            }
        }
    }

    /// Check whether an entry file exists (regardless of whether it parses).
    pub fn contains(&self, namespace: Namespace, key: &str) -> bool {
        self.entry_path(namespace, key).exists()
    }

    /// Number of entries in a namespace.
    pub fn entry_count(&self, namespace: Namespace) -> usize {
        fs::read_dir(self.namespace_dir(namespace))
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| {
                        let path = e.path();
                        path.extension().and_then(|s| s.to_str()) == Some("json")
                            && e.file_type().map(|t| t.is_file()).unwrap_or(false)
                    })
                    .count()
            })
            .unwrap_or(0)
    }

    fn namespace_dir(&self, namespace: Namespace) -> PathBuf {
        self.root.join(namespace.as_str())
    }

    /// Get the file path for a key.
    fn entry_path(&self, namespace: Namespace, key: &str) -> PathBuf {
        self.namespace_dir(namespace)
            .join(format!("{}.json", file_stem(key)))
    }
}

/// File stem for a key.
///
/// Keys that could escape the namespace directory are replaced by their digest.
fn file_stem(key: &str) -> String {
    let unsafe_key = key.is_empty()
        || key == "."
        || key.contains("..")
        || key.contains(['/', '\\', '\0', ':']);
    if unsafe_key {
        format!("{:x}", Sha256::digest(key.as_bytes()))
    } else {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let cache = CacheStore::new(temp.path());

        let doc = json!({ "lyrics": "hello\nworld" });
        cache.save(Namespace::Lyrics, "42", &doc).unwrap();

        let loaded: serde_json::Value = cache.load(Namespace::Lyrics, "42").unwrap();
        assert_eq!(loaded, doc);
        assert!(temp.path().join("lyrics").join("42.json").exists());
    }

    #[test]
    fn test_cache_miss() {
        let temp = TempDir::new().unwrap();
        let cache = CacheStore::new(temp.path());

        let loaded: Option<serde_json::Value> = cache.load(Namespace::Sentiment, "nope");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_corrupted_entry_is_a_miss() {
        let temp = TempDir::new().unwrap();
        let cache = CacheStore::new(temp.path());

        let dir = temp.path().join("preprocessed");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("7.json"), b"{ not json").unwrap();

        assert!(cache.contains(Namespace::Preprocessed, "7"));
        let loaded: Option<serde_json::Value> = cache.load(Namespace::Preprocessed, "7");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_wrong_shape_is_a_miss() {
        let temp = TempDir::new().unwrap();
        let cache = CacheStore::new(temp.path());

        cache.save(Namespace::Sentiment, "k", &json!([1, 2, 3])).unwrap();
        let loaded: Option<crate::model::SongRecord> = cache.load(Namespace::Sentiment, "k");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_resave_overwrites() {
        let temp = TempDir::new().unwrap();
        let cache = CacheStore::new(temp.path());

        cache.save(Namespace::Lyrics, "1", &json!({ "lyrics": "old" })).unwrap();
        cache.save(Namespace::Lyrics, "1", &json!({ "lyrics": "new" })).unwrap();

        let loaded: serde_json::Value = cache.load(Namespace::Lyrics, "1").unwrap();
        assert_eq!(loaded["lyrics"], "new");
        assert_eq!(cache.entry_count(Namespace::Lyrics), 1);
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let temp = TempDir::new().unwrap();
        let cache = CacheStore::new(temp.path());

        cache.save(Namespace::Lyrics, "1", &json!({ "lyrics": "a" })).unwrap();
        let other: Option<serde_json::Value> = cache.load(Namespace::Preprocessed, "1");
        assert!(other.is_none());
        assert_eq!(cache.entry_count(Namespace::Lyrics), 1);
        assert_eq!(cache.entry_count(Namespace::Preprocessed), 0);
    }

    #[test]
    fn test_path_like_keys_stay_inside_namespace() {
        let temp = TempDir::new().unwrap();
        let cache = CacheStore::new(temp.path());

        cache.save(Namespace::Lyrics, "../escape", &json!({ "lyrics": "x" })).unwrap();
        assert!(!temp.path().join("escape.json").exists());
        assert_eq!(cache.entry_count(Namespace::Lyrics), 1);

        let loaded: serde_json::Value = cache.load(Namespace::Lyrics, "../escape").unwrap();
        assert_eq!(loaded["lyrics"], "x");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp = TempDir::new().unwrap();
        let cache = CacheStore::new(temp.path());

        cache.save(Namespace::Sentiment, "abc", &json!({ "ok": true })).unwrap();
        let names: Vec<_> = fs::read_dir(temp.path().join("sentiment"))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["abc.json".to_string()]);
    }
}

/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;
    use tempfile::TempDir;

    /// Arbitrary JSON documents, including finite floats such as
    /// sentiment scores.
    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            (prop::num::f64::NORMAL | prop::num::f64::ZERO).prop_map(Value::from),
            (0.0f64..=1.0).prop_map(Value::from),
            ".{0,20}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{1,8}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        /// Whatever is saved is loaded back deep-equal
        #[test]
        fn save_then_load_roundtrips(doc in json_value(), key in "[A-Za-z0-9_-]{1,24}") {
            let temp = TempDir::new().unwrap();
            let cache = CacheStore::new(temp.path());

            cache.save(Namespace::Sentiment, &key, &doc).unwrap();
            let loaded: Option<Value> = cache.load(Namespace::Sentiment, &key);
            prop_assert_eq!(loaded, Some(doc));
        }
    }
}

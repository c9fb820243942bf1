//! Song metadata loading.
//!
//! The batch source is a JSON array of objects, each with at least a string
//! `title` and `artist`. `id` is optional and may be a string or an integer.
//! One malformed item rejects the whole file; nothing is skipped silently.
//!
//! ```json
//! [
//!   { "id": "1", "title": "Hello", "artist": "Adele" },
//!   { "id": 2, "title": "Yesterday", "artist": "The Beatles" },
//!   { "title": "Untracked Song", "artist": "Someone" }
//! ]
//! ```

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::model::SongRecord;

/// Errors loading or validating the metadata source.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Metadata file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read metadata file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse metadata JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Metadata must be a JSON array of objects")]
    NotAnArray,

    #[error("Invalid metadata item #{index}: missing or non-string '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Invalid metadata item #{index}: 'id' must be a string or integer")]
    InvalidId { index: usize },
}

/// Load and validate song metadata from a JSON file.
pub fn load(path: &Path) -> Result<Vec<SongRecord>, MetadataError> {
    if !path.exists() {
        return Err(MetadataError::NotFound(path.to_path_buf()));
    }

    let contents =
        std::fs::read_to_string(path).map_err(|e| MetadataError::Read(path.to_path_buf(), e))?;
    let songs = parse(&contents)?;

    tracing::info!("Loaded {} songs from {:?}", songs.len(), path);
    Ok(songs)
}

/// Parse and validate metadata JSON text.
pub fn parse(json: &str) -> Result<Vec<SongRecord>, MetadataError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(MetadataError::NotAnArray);
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_item(index, item))
        .collect()
}

fn parse_item(index: usize, item: &Value) -> Result<SongRecord, MetadataError> {
    let Value::Object(fields) = item else {
        return Err(MetadataError::NotAnArray);
    };

    let required = |field: &'static str| {
        fields
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(MetadataError::MissingField { index, field })
    };
    let title = required("title")?;
    let artist = required("artist")?;

    let id = match fields.get("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        Some(_) => return Err(MetadataError::InvalidId { index }),
    };

    Ok(SongRecord::new(id, title, artist))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_metadata() {
        let json = r#"[
            { "id": "1", "title": "X", "artist": "Y" },
            { "id": 2, "title": "A", "artist": "B", "year": 1999 },
            { "title": "No Id", "artist": "C" },
            { "id": null, "title": "Null Id", "artist": "D" }
        ]"#;

        let songs = parse(json).unwrap();
        assert_eq!(songs.len(), 4);
        assert_eq!(songs[0].id.as_deref(), Some("1"));
        assert_eq!(songs[1].id.as_deref(), Some("2"));
        assert_eq!(songs[1].title, "A");
        assert!(songs[2].id.is_none());
        assert!(songs[3].id.is_none());
        assert!(songs.iter().all(|s| s.lyrics.is_none()));
    }

    #[test]
    fn test_missing_field_fails_whole_load() {
        let json = r#"[
            { "id": "1", "title": "X", "artist": "Y" },
            { "id": "2", "title": "No artist" }
        ]"#;

        let err = parse(json).unwrap_err();
        assert!(matches!(
            err,
            MetadataError::MissingField { index: 1, field: "artist" }
        ));
    }

    #[test]
    fn test_non_string_title_is_rejected() {
        let err = parse(r#"[{ "title": 5, "artist": "Y" }]"#).unwrap_err();
        assert!(matches!(err, MetadataError::MissingField { index: 0, field: "title" }));
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        let err = parse(r#"[{ "id": 1.5, "title": "X", "artist": "Y" }]"#).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidId { index: 0 }));
    }

    #[test]
    fn test_non_array_is_rejected() {
        assert!(matches!(
            parse(r#"{ "title": "X", "artist": "Y" }"#),
            Err(MetadataError::NotAnArray)
        ));
        assert!(matches!(parse("not json"), Err(MetadataError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, MetadataError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.json");
        std::fs::write(&path, r#"[{ "id": "9", "title": "T", "artist": "A" }]"#).unwrap();

        let songs = load(&path).unwrap();
        assert_eq!(songs, vec![SongRecord::new(Some("9".into()), "T", "A")]);
    }
}

//! JSON persistence for [`RecordStore`] with atomic replacement.
//!
//! # File format
//!
//! ```text
//! {
//!   "a": { "label": "apples", "key": "a", "count": 7 }
//! }
//! ```
//!
//! Keys are written in ascending order. On load, map keys and the `key` field
//! may also be decimal codepoints and field names may use the capitalised
//! `Label`/`Rune`/`Count` spellings of older files.
//!
//! The insertion order of a loaded store follows the decoded map, not the
//! order the records had when they were saved.
//!
//! # Save strategy
//!
//! serialize → temp file in the target directory → fsync → rename over target.
//! Readers never observe a partial file; the previous file stays intact until
//! the rename succeeds.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::records::{Record, RecordStore};
use crate::core::errors::{Result, TallyError};

/// On-disk shape of a single record.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    #[serde(alias = "Label")]
    label: String,
    #[serde(alias = "Rune", deserialize_with = "deserialize_key")]
    key: char,
    #[serde(alias = "Count")]
    count: u64,
}

impl From<&Record> for StoredRecord {
    fn from(record: &Record) -> Self {
        Self {
            label: record.label.clone(),
            key: record.key,
            count: record.count,
        }
    }
}

/// Load a store from `path`.
///
/// A missing path, a missing file, or an empty file all yield an empty store.
pub fn load(path: Option<&Path>) -> Result<RecordStore> {
    let Some(path) = path else {
        return Ok(RecordStore::new());
    };

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RecordStore::new()),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return Err(TallyError::corrupt(path, e.to_string()));
        }
        Err(e) => return Err(TallyError::io(path, e)),
    };

    decode(&raw).map_err(|details| TallyError::corrupt(path, details))
}

/// Decode file contents into a store. Blank input is an empty store.
pub fn decode(raw: &str) -> std::result::Result<RecordStore, String> {
    if raw.trim().is_empty() {
        return Ok(RecordStore::new());
    }

    let entries: BTreeMap<String, StoredRecord> =
        serde_json::from_str(raw).map_err(|e| e.to_string())?;

    let mut store = RecordStore::new();
    for (raw_key, stored) in entries {
        let key = parse_key(&raw_key)
            .ok_or_else(|| format!("map key {raw_key:?} is not a single character or codepoint"))?;
        if stored.key != key {
            return Err(format!(
                "record under {key:?} carries mismatched key {:?}",
                stored.key
            ));
        }
        store.insert(Record {
            label: stored.label,
            key,
            count: stored.count,
        });
    }
    Ok(store)
}

/// Encode a store as pretty JSON, keys ascending.
pub fn encode(store: &RecordStore) -> Result<String> {
    let entries: BTreeMap<char, StoredRecord> =
        store.iter().map(|r| (r.key, StoredRecord::from(r))).collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

/// Atomically replace `path` with the serialized store.
///
/// With no path this is a successful no-op. Returns the path written.
pub fn save(path: Option<&Path>, store: &RecordStore) -> Result<Option<PathBuf>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let staged = stage(path, store)?;
    replace(staged, path)?;
    Ok(Some(path.to_path_buf()))
}

/// Write the serialized store to a synced temp file next to `path`.
///
/// Nothing at `path` changes until the returned file is persisted; dropping
/// it removes the temp file.
fn stage(path: &Path, store: &RecordStore) -> Result<NamedTempFile> {
    let json = encode(store)?;
    let dir = parent_dir(path);
    fs::create_dir_all(&dir).map_err(|e| TallyError::io(&dir, e))?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| TallyError::io(&dir, e))?;
    tmp.write_all(json.as_bytes())
        .and_then(|()| tmp.write_all(b"\n"))
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| TallyError::io(tmp.path(), e))?;
    Ok(tmp)
}

#[cfg(not(windows))]
fn replace(tmp: NamedTempFile, path: &Path) -> Result<()> {
    tmp.persist(path)
        .map(drop)
        .map_err(|e| TallyError::io(path, e.error))
}

// Rename cannot overwrite an existing file here; remove it first.
#[cfg(windows)]
fn replace(tmp: NamedTempFile, path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(TallyError::io(path, e)),
    }
    tmp.persist(path)
        .map(drop)
        .map_err(|e| TallyError::io(path, e.error))
}

/// Directory the temp file goes into; a bare file name means the CWD.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// A map key is either the character itself or its decimal codepoint.
fn parse_key(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        (Some(_), Some(_)) => raw.parse::<u32>().ok().and_then(char::from_u32),
        (None, _) => None,
    }
}

fn deserialize_key<'de, D>(deserializer: D) -> std::result::Result<char, D::Error>
where
    D: Deserializer<'de>,
{
    struct KeyVisitor;

    impl Visitor<'_> for KeyVisitor {
        type Value = char;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a single character or a unicode codepoint")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<char, E> {
            u32::try_from(v)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| E::custom(format!("{v} is not a valid codepoint")))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<char, E> {
            u64::try_from(v)
                .map_err(|_| E::custom(format!("{v} is not a valid codepoint")))
                .and_then(|v| self.visit_u64(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<char, E> {
            let mut chars = v.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(E::custom(format!("{v:?} is not a single character"))),
            }
        }
    }

    deserializer.deserialize_any(KeyVisitor)
}

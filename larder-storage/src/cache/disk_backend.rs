//! File-backed record store for the durable cache tier.
//!
//! One JSON file per recipe, named `cache_<sanitized id>.json`, inside a
//! single data directory shared with the library store.
//!
//! # Expiry
//!
//! No timestamp is persisted. The file's last-write time is the only age
//! signal; a record older than the configured TTL is deleted the next time
//! it is read and reported as absent.
//!
//! # Failure policy
//!
//! Reads never fail. Missing, expired or undecodable files are cache
//! misses and are logged. Writes report [`StorageError::Unavailable`] so the
//! caller can log it, but callers treat that as non-fatal.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use larder_core::{Recipe, StorageError};
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use super::traits::RecordStore;

/// File name prefix of every cache record.
pub const RECORD_PREFIX: &str = "cache_";

/// File name suffix of every cache record.
pub const RECORD_SUFFIX: &str = ".json";

/// Default record lifetime: 30 days.
pub const DEFAULT_RECORD_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Stand-in file stem for ids that sanitize to nothing.
const UNKNOWN_STEM: &str = "unknown";

/// Characters never allowed in a file name on any supported platform.
const INVALID_FILE_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Field names of the persisted recipe layout, used to match keys
/// regardless of case.
const RECORD_FIELDS: [&str; 8] = [
    "id",
    "name",
    "category",
    "area",
    "instructions",
    "imageUrl",
    "ingredients",
    "measure",
];

/// Strip characters that cannot appear in a path segment.
pub fn sanitize_id(id: &str) -> String {
    let safe: String = id
        .chars()
        .filter(|c| !c.is_control() && !INVALID_FILE_CHARS.contains(c))
        .collect();
    if safe.trim().is_empty() {
        UNKNOWN_STEM.to_string()
    } else {
        safe
    }
}

/// Whether a file name follows the cache record convention.
pub fn is_record_file_name(name: &str) -> bool {
    name.len() > RECORD_PREFIX.len() + RECORD_SUFFIX.len()
        && name.starts_with(RECORD_PREFIX)
        && name.ends_with(RECORD_SUFFIX)
}

/// Decode a persisted recipe, matching field names case-insensitively.
///
/// Fields holding `null` are treated as absent and take their defaults.
pub fn decode_record(json: &str) -> Result<Recipe, serde_json::Error> {
    let value: Value = serde_json::from_str(json)?;
    serde_json::from_value(canonical_keys(value))
}

fn canonical_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| {
                    let key = RECORD_FIELDS
                        .iter()
                        .find(|field| field.eq_ignore_ascii_case(&key))
                        .map(|field| field.to_string())
                        .unwrap_or(key);
                    (key, canonical_keys(value))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(canonical_keys).collect()),
        other => other,
    }
}

/// Directory-of-JSON-files record store with age-based expiry.
#[derive(Debug, Clone)]
pub struct DiskRecordStore {
    dir: PathBuf,
    ttl: Duration,
}

impl DiskRecordStore {
    /// Create a store rooted at `dir` with the default 30-day TTL.
    ///
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: DEFAULT_RECORD_TTL,
        }
    }

    /// Set the record TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Path of the record file for `id`.
    pub fn record_path(&self, id: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", RECORD_PREFIX, sanitize_id(id), RECORD_SUFFIX))
    }

    fn is_expired(&self, modified: SystemTime) -> bool {
        // A timestamp in the future counts as brand new.
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        age > self.ttl
    }
}

fn unavailable(path: &Path, err: impl ToString) -> StorageError {
    StorageError::Unavailable {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl RecordStore for DiskRecordStore {
    async fn read(&self, id: &str) -> Option<Recipe> {
        let path = self.record_path(id);

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(recipe_id = id, error = %unavailable(&path, e), "disk record unreadable");
                return None;
            }
        };

        match metadata.modified() {
            Ok(modified) if self.is_expired(modified) => {
                debug!(recipe_id = id, path = %path.display(), "disk record expired");
                if let Err(e) = fs::remove_file(&path).await {
                    if e.kind() != ErrorKind::NotFound {
                        warn!(recipe_id = id, error = %e, "failed to delete expired disk record");
                    }
                }
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                debug!(recipe_id = id, error = %e, "no modification time, serving record without expiry");
            }
        }

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) => {
                warn!(recipe_id = id, error = %unavailable(&path, e), "disk record unreadable");
                return None;
            }
        };

        match decode_record(&contents) {
            Ok(recipe) => Some(recipe),
            Err(e) => {
                let err = StorageError::Corrupt {
                    path,
                    reason: e.to_string(),
                };
                warn!(recipe_id = id, error = %err, "treating corrupt disk record as a miss");
                None
            }
        }
    }

    async fn write(&self, recipe: &Recipe) -> Result<(), StorageError> {
        if !recipe.has_id() {
            return Ok(());
        }
        let path = self.record_path(&recipe.id);

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| unavailable(&self.dir, e))?;
        let json = serde_json::to_string(recipe).map_err(|e| unavailable(&path, e))?;
        fs::write(&path, json)
            .await
            .map_err(|e| unavailable(&path, e))?;

        debug!(recipe_id = %recipe.id, path = %path.display(), "disk record written");
        Ok(())
    }

    async fn contains(&self, id: &str) -> bool {
        fs::try_exists(self.record_path(id)).await.unwrap_or(false)
    }

    async fn clear(&self) -> u64 {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return 0,
            Err(e) => {
                warn!(error = %unavailable(&self.dir, e), "cannot list cache directory");
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "cache directory listing interrupted");
                    break;
                }
            };
            let is_record = entry
                .file_name()
                .to_str()
                .is_some_and(is_record_file_name);
            if !is_record {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %entry.path().display(), error = %e, "failed to delete disk record"),
            }
        }
        removed
    }
}

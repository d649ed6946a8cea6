//! Key-value media backing the collection stores.
//!
//! A medium maps fixed string keys to serialized blobs. It has no notion of
//! records, versions, or writers: the last `set` for a key wins.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ErrorCode;

/// Default per-value capacity, matching the usual browser storage quota.
pub const DEFAULT_MAX_VALUE_BYTES: usize = 5 * 1024 * 1024;

/// Errors raised by a key-value medium.
#[derive(Debug, thiserror::Error)]
pub enum MediumError {
    /// Underlying I/O failure.
    #[error("storage I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The value exceeds the medium's capacity.
    #[error("storage quota exceeded for '{key}': {size} bytes > {limit} bytes")]
    QuotaExceeded { key: String, size: usize, limit: usize },

    /// The key contains characters the medium cannot address.
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

impl MediumError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::QuotaExceeded { .. } => ErrorCode::QuotaExceeded,
            Self::Io { .. } | Self::InvalidKey(_) => ErrorCode::StorageWrite,
        }
    }
}

/// A synchronous string key-value medium.
///
/// Methods take `&self`: several stores share one medium, and no operation
/// spans more than a single key.
pub trait KvMedium {
    /// Read the raw value for `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, MediumError>;

    /// Overwrite the value for `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), MediumError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), MediumError>;
}

fn check_key(key: &str) -> Result<(), MediumError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(MediumError::InvalidKey(key.to_string()))
    }
}

fn enforce_quota(key: &str, value: &str, limit: usize) -> Result<(), MediumError> {
    if value.len() > limit {
        return Err(MediumError::QuotaExceeded {
            key: key.to_string(),
            size: value.len(),
            limit,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// FileMedium
// ---------------------------------------------------------------------------

/// Directory-backed medium: key `k` lives in `<root>/k.json`.
///
/// Writes go to a temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileMedium {
    root: PathBuf,
    max_value_bytes: usize,
}

impl FileMedium {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }

    #[must_use]
    pub const fn with_max_value_bytes(mut self, limit: usize) -> Self {
        self.max_value_bytes = limit;
        self
    }

    /// Directory holding the value files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn io_err(key: &str) -> impl FnOnce(io::Error) -> MediumError + '_ {
        move |source| MediumError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl KvMedium for FileMedium {
    fn get(&self, key: &str) -> Result<Option<String>, MediumError> {
        check_key(key)?;
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Self::io_err(key)(err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MediumError> {
        check_key(key)?;
        enforce_quota(key, value, self.max_value_bytes)?;

        fs::create_dir_all(&self.root).map_err(Self::io_err(key))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value.as_bytes()).map_err(Self::io_err(key))?;
        fs::rename(&tmp, &path).map_err(Self::io_err(key))?;

        tracing::trace!(key, bytes = value.len(), path = %path.display(), "value written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MediumError> {
        check_key(key)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::io_err(key)(err)),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryMedium
// ---------------------------------------------------------------------------

/// In-process medium. Clones share the same underlying map.
#[derive(Debug, Clone)]
pub struct MemoryMedium {
    values: Arc<Mutex<BTreeMap<String, String>>>,
    max_value_bytes: usize,
}

impl Default for MemoryMedium {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMedium {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(BTreeMap::new())),
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }

    #[must_use]
    pub const fn with_max_value_bytes(mut self, limit: usize) -> Self {
        self.max_value_bytes = limit;
        self
    }

    /// Snapshot of the raw value for `key`, bypassing key checks.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl KvMedium for MemoryMedium {
    fn get(&self, key: &str) -> Result<Option<String>, MediumError> {
        check_key(key)?;
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MediumError> {
        check_key(key)?;
        enforce_quota(key, value, self.max_value_bytes)?;
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MediumError> {
        check_key(key)?;
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

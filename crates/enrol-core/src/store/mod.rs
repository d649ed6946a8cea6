//! Collection stores: one named collection persisted as a single JSON blob.
//!
//! A [`CollectionStore`] is the only writer of its key. Callers read through
//! [`CollectionStore::records`] and persist through
//! [`CollectionStore::replace`]; every successful replace rewrites the whole
//! collection (last writer wins, no merge, no versioning).
//!
//! # Load semantics
//!
//! | Medium state                  | Data after load | Medium after load | Outcome       |
//! |-------------------------------|-----------------|-------------------|---------------|
//! | key absent                    | defaults        | defaults written  | `Seeded`      |
//! | valid value                   | stored value    | unchanged         | `Loaded`      |
//! | wrong shape or record rules   | defaults        | defaults written  | `Healed`      |
//! | unreadable / unparseable      | defaults        | unchanged         | `Recovered`   |
//!
//! The caller always ends up with usable data.

pub mod medium;
pub mod shape;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

use crate::error::ErrorCode;
use crate::model::{Application, University};
use crate::seed;
use medium::{KvMedium, MediumError};
use shape::ShapeError;

/// Describes one persisted collection: its key, defaults and validators.
pub trait Collection {
    type Record: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned;

    /// Medium key holding the serialized collection.
    const KEY: &'static str;

    /// Built-in dataset used when the key is absent or corrupt.
    fn defaults() -> Vec<Self::Record>;

    /// Structural check on the raw value (load and write paths).
    fn check_shape(value: &Value) -> Result<(), ShapeError>;

    /// Record-level rules. Stored data breaking them heals like a shape
    /// failure, so a loaded collection always passes them.
    fn check_records(records: &[Self::Record]) -> Result<(), ShapeError>;
}

/// The university catalog.
#[derive(Debug, Clone, Copy)]
pub struct Universities;

impl Collection for Universities {
    type Record = University;

    const KEY: &'static str = "universities";

    fn defaults() -> Vec<University> {
        seed::universities()
    }

    fn check_shape(value: &Value) -> Result<(), ShapeError> {
        shape::universities(value)
    }

    fn check_records(records: &[University]) -> Result<(), ShapeError> {
        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        for (index, uni) in records.iter().enumerate() {
            let name = uni.name.trim();
            if name.is_empty() {
                return Err(ShapeError::at(index, "name must not be empty"));
            }
            if !names.insert(name) {
                return Err(ShapeError::at(index, format!("duplicate name '{name}'")));
            }
            if !uni.id.is_empty() && !ids.insert(uni.id.as_str()) {
                return Err(ShapeError::at(index, format!("duplicate id '{}'", uni.id)));
            }
        }
        Ok(())
    }
}

/// Submitted applications.
#[derive(Debug, Clone, Copy)]
pub struct Applications;

impl Collection for Applications {
    type Record = Application;

    const KEY: &'static str = "applications";

    fn defaults() -> Vec<Application> {
        seed::applications()
    }

    fn check_shape(value: &Value) -> Result<(), ShapeError> {
        shape::applications(value)
    }

    fn check_records(records: &[Application]) -> Result<(), ShapeError> {
        let mut ids = HashSet::new();
        for (index, app) in records.iter().enumerate() {
            if app.id.trim().is_empty() {
                return Err(ShapeError::at(index, "id must not be empty"));
            }
            if !ids.insert(app.id.as_str()) {
                return Err(ShapeError::at(index, format!("duplicate id '{}'", app.id)));
            }
        }
        Ok(())
    }
}

/// Errors surfaced by a collection store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The stored value could not be read or parsed. Non-fatal: defaults are served.
    #[error("failed to read '{key}': {reason}")]
    Read { key: &'static str, reason: String },

    /// Caller-supplied collection failed validation. Nothing was written.
    #[error("invalid {key}: {source}")]
    Validation {
        key: &'static str,
        #[source]
        source: ShapeError,
    },

    /// The medium rejected the write. Previous data is kept.
    #[error("failed to write '{key}': {reason}")]
    Write {
        key: &'static str,
        reason: String,
        quota: bool,
    },
}

impl StoreError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::StorageRead,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::Write { quota: true, .. } => ErrorCode::QuotaExceeded,
            Self::Write { .. } => ErrorCode::StorageWrite,
        }
    }

    fn write(key: &'static str, err: &MediumError) -> Self {
        Self::Write {
            key,
            reason: err.to_string(),
            quota: matches!(err, MediumError::QuotaExceeded { .. }),
        }
    }
}

/// Lifecycle of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

/// What a call to [`CollectionStore::load`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored value was valid and is now in memory.
    Loaded,
    /// Key was absent; defaults were written.
    Seeded,
    /// Stored value had the wrong shape; defaults were written over it.
    Healed(ShapeError),
    /// Read or write failed; defaults are served and the error is recorded.
    Recovered(StoreError),
}

impl LoadOutcome {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Seeded => "seeded",
            Self::Healed(_) => "healed",
            Self::Recovered(_) => "recovered",
        }
    }
}

/// Single source of truth for one collection.
#[derive(Debug)]
pub struct CollectionStore<C: Collection, M: KvMedium> {
    medium: M,
    records: Vec<C::Record>,
    phase: Phase,
    error: Option<StoreError>,
    _collection: PhantomData<C>,
}

/// Store over the university catalog.
pub type UniversityStore<M> = CollectionStore<Universities, M>;

/// Store over submitted applications.
pub type ApplicationStore<M> = CollectionStore<Applications, M>;

impl<C: Collection, M: KvMedium> CollectionStore<C, M> {
    /// Create an uninitialized store. Call [`load`](Self::load) before use.
    pub const fn new(medium: M) -> Self {
        Self {
            medium,
            records: Vec::new(),
            phase: Phase::Uninitialized,
            error: None,
            _collection: PhantomData,
        }
    }

    /// Create a store and load it immediately.
    pub fn open(medium: M) -> Self {
        let mut store = Self::new(medium);
        store.load();
        store
    }

    /// Current in-memory collection.
    pub fn records(&self) -> &[C::Record] {
        &self.records
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Last error, cleared by the next successful load or replace.
    pub const fn error(&self) -> Option<&StoreError> {
        self.error.as_ref()
    }

    pub const fn medium(&self) -> &M {
        &self.medium
    }

    /// Read the collection from the medium. Never leaves the store without data.
    pub fn load(&mut self) -> LoadOutcome {
        self.phase = Phase::Loading;

        let raw = match self.medium.get(C::KEY) {
            Ok(raw) => raw,
            Err(err) => {
                return self.recover(StoreError::Read {
                    key: C::KEY,
                    reason: err.to_string(),
                });
            }
        };

        let Some(raw) = raw else {
            return match self.write_defaults() {
                Ok(()) => {
                    tracing::debug!(key = C::KEY, records = self.records.len(), "seeded defaults");
                    LoadOutcome::Seeded
                }
                Err(err) => self.recover(err),
            };
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                return self.recover(StoreError::Read {
                    key: C::KEY,
                    reason: err.to_string(),
                });
            }
        };

        match decode::<C>(value) {
            Ok(records) => {
                tracing::debug!(key = C::KEY, records = records.len(), "loaded");
                self.records = records;
                self.mark_ready();
                LoadOutcome::Loaded
            }
            Err(reason) => {
                tracing::warn!(key = C::KEY, %reason, "stored value has wrong shape; restoring defaults");
                match self.write_defaults() {
                    Ok(()) => LoadOutcome::Healed(reason),
                    Err(err) => self.recover(err),
                }
            }
        }
    }

    /// Re-run [`load`](Self::load), typically after an error.
    pub fn refresh(&mut self) -> LoadOutcome {
        self.load()
    }

    /// Validate, persist and adopt `records` as the whole collection.
    ///
    /// All-or-nothing: on error neither the medium nor the in-memory data
    /// changes.
    pub fn replace(&mut self, records: Vec<C::Record>) -> Result<(), StoreError> {
        let result = self.try_replace(records);
        if let Err(err) = &result {
            tracing::warn!(key = C::KEY, error = %err, "replace rejected");
            self.error = Some(err.clone());
            self.phase = Phase::Failed;
        }
        result
    }

    /// Replace from an untyped value, as read from an import file.
    pub fn replace_json(&mut self, value: Value) -> Result<(), StoreError> {
        match decode::<C>(value) {
            Ok(records) => self.replace(records),
            Err(source) => {
                let err = StoreError::Validation { key: C::KEY, source };
                tracing::warn!(key = C::KEY, error = %err, "import rejected");
                self.error = Some(err.clone());
                self.phase = Phase::Failed;
                Err(err)
            }
        }
    }

    fn try_replace(&mut self, records: Vec<C::Record>) -> Result<(), StoreError> {
        let validation = |source| StoreError::Validation { key: C::KEY, source };

        let value = serde_json::to_value(&records)
            .map_err(|err| validation(ShapeError::whole(err.to_string())))?;
        C::check_shape(&value).map_err(validation)?;
        C::check_records(&records).map_err(validation)?;

        let raw = value.to_string();
        self.medium
            .set(C::KEY, &raw)
            .map_err(|err| StoreError::write(C::KEY, &err))?;

        tracing::debug!(key = C::KEY, records = records.len(), bytes = raw.len(), "replaced");
        self.records = records;
        self.mark_ready();
        Ok(())
    }

    fn write_defaults(&mut self) -> Result<(), StoreError> {
        let defaults = C::defaults();
        let raw = serde_json::to_string(&defaults).map_err(|err| StoreError::Write {
            key: C::KEY,
            reason: err.to_string(),
            quota: false,
        })?;
        self.records = defaults;
        self.medium
            .set(C::KEY, &raw)
            .map_err(|err| StoreError::write(C::KEY, &err))?;
        self.mark_ready();
        Ok(())
    }

    fn recover(&mut self, err: StoreError) -> LoadOutcome {
        tracing::error!(key = C::KEY, error = %err, "load failed; serving defaults");
        self.records = C::defaults();
        self.phase = Phase::Failed;
        self.error = Some(err.clone());
        LoadOutcome::Recovered(err)
    }

    fn mark_ready(&mut self) {
        self.phase = Phase::Ready;
        self.error = None;
    }
}

fn decode<C: Collection>(value: Value) -> Result<Vec<C::Record>, ShapeError> {
    C::check_shape(&value)?;
    let records: Vec<C::Record> =
        serde_json::from_value(value).map_err(|err| ShapeError::whole(err.to_string()))?;
    C::check_records(&records)?;
    Ok(records)
}

//! University catalog: list edits, program listing, filters and stats.
//!
//! Every edit reads the store's current records, builds the new full list
//! and hands it to [`CollectionStore::replace`](crate::store::CollectionStore::replace).
//! Nothing here holds state of its own.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::ErrorCode;
use crate::form::{self, UniversityErrors};
use crate::model::{Program, RecordKey, University};
use crate::store::medium::KvMedium;
use crate::store::{StoreError, UniversityStore};
use crate::uri;

/// Separator between the two encoded halves of a program route id.
pub const PROGRAM_REF_SEPARATOR: &str = "---";

/// Errors from catalog edits and lookups.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("university not found: {0}")]
    NotFound(RecordKey),

    #[error("no university matches '{0}'")]
    UnknownUniversity(String),

    #[error("program not found: '{0}'")]
    ProgramNotFound(String),

    #[error("invalid university: {0}")]
    Invalid(UniversityErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) | Self::UnknownUniversity(_) => ErrorCode::RecordNotFound,
            Self::ProgramNotFound(_) => ErrorCode::ProgramNotFound,
            Self::Invalid(_) => ErrorCode::ValidationFailed,
            Self::Store(err) => err.code(),
        }
    }
}

// ---------------------------------------------------------------------------
// Edits
// ---------------------------------------------------------------------------

/// An empty university with a fresh id, ready to be filled in.
#[must_use]
pub fn draft_university() -> University {
    University {
        id: University::new_id(),
        ..University::default()
    }
}

fn ensure_valid(university: &University) -> Result<(), CatalogError> {
    let errors = form::validate_university(university);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::Invalid(errors))
    }
}

/// Validate and append a university. An empty id is replaced by a fresh one.
///
/// Returns the key the new record is addressed by.
pub fn add_university<M: KvMedium>(
    store: &mut UniversityStore<M>,
    mut university: University,
) -> Result<RecordKey, CatalogError> {
    ensure_valid(&university)?;
    if university.id.trim().is_empty() {
        university.id = University::new_id();
    }
    let key = university.key();

    let mut records = store.records().to_vec();
    records.push(university);
    store.replace(records)?;

    tracing::info!(%key, "university added");
    Ok(key)
}

/// Replace the record captured as `original` with `edited`.
///
/// `original` must be taken before the edit so renames still hit the right
/// element.
pub fn update_university<M: KvMedium>(
    store: &mut UniversityStore<M>,
    original: &RecordKey,
    edited: University,
) -> Result<(), CatalogError> {
    let index = position(store.records(), original)?;
    ensure_valid(&edited)?;

    let mut records = store.records().to_vec();
    records[index] = edited;
    store.replace(records)?;

    tracing::info!(key = %original, "university updated");
    Ok(())
}

/// Remove the record addressed by `key`.
pub fn delete_university<M: KvMedium>(
    store: &mut UniversityStore<M>,
    key: &RecordKey,
) -> Result<University, CatalogError> {
    let index = position(store.records(), key)?;

    let mut records = store.records().to_vec();
    let removed = records.remove(index);
    store.replace(records)?;

    tracing::info!(%key, name = %removed.name, "university deleted");
    Ok(removed)
}

fn position(records: &[University], key: &RecordKey) -> Result<usize, CatalogError> {
    records
        .iter()
        .position(|u| key.matches(u))
        .ok_or_else(|| CatalogError::NotFound(key.clone()))
}

/// Look a university up by id, falling back to exact name.
pub fn find_university<'a>(
    records: &'a [University],
    id_or_name: &str,
) -> Result<&'a University, CatalogError> {
    records
        .iter()
        .find(|u| !u.id.is_empty() && u.id == id_or_name)
        .or_else(|| records.iter().find(|u| u.name == id_or_name))
        .ok_or_else(|| CatalogError::UnknownUniversity(id_or_name.to_string()))
}

// ---------------------------------------------------------------------------
// Program listing
// ---------------------------------------------------------------------------

/// Route id for a program: both halves percent-encoded, joined by `---`.
#[must_use]
pub fn program_ref(university: &str, title: &str) -> String {
    format!(
        "{}{PROGRAM_REF_SEPARATOR}{}",
        uri::encode_component(university),
        uri::encode_component(title)
    )
}

/// Resolve a route id to its university and program.
///
/// Every `---` in the id is tried as the split point, left to right.
pub fn resolve_program<'a>(
    records: &'a [University],
    program_id: &str,
) -> Result<(&'a University, &'a Program), CatalogError> {
    program_id
        .match_indices(PROGRAM_REF_SEPARATOR)
        .find_map(|(at, sep)| {
            let university = uri::decode_component(&program_id[..at])?;
            let title = uri::decode_component(&program_id[at + sep.len()..])?;
            let uni = records.iter().find(|u| u.name == university)?;
            uni.program(&title).map(|program| (uni, program))
        })
        .ok_or_else(|| CatalogError::ProgramNotFound(program_id.to_string()))
}

/// A program flattened with its university's display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramListing {
    pub id: String,
    #[serde(flatten)]
    pub program: Program,
    pub university_name: String,
    pub university_logo: String,
    pub location: String,
    pub country: String,
}

/// Every program of every university, in catalog order.
#[must_use]
pub fn list_programs(records: &[University]) -> Vec<ProgramListing> {
    records
        .iter()
        .flat_map(|uni| {
            uni.programs.iter().map(move |program| ProgramListing {
                id: program_ref(&uni.name, &program.title),
                program: program.clone(),
                university_name: uni.name.clone(),
                university_logo: uni.logo.clone(),
                location: uni.location.clone(),
                country: uni.country.clone(),
            })
        })
        .collect()
}

fn contains_lower(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn exact(filter: Option<&String>, value: &str) -> bool {
    filter.is_none_or(|f| f.is_empty() || f == value)
}

/// Public program search.
#[derive(Debug, Clone, Default)]
pub struct ProgramFilter {
    /// Case-insensitive substring of program title or university name.
    pub search: String,
    pub country: Option<String>,
    pub language: Option<String>,
}

impl ProgramFilter {
    #[must_use]
    pub fn matches(&self, listing: &ProgramListing) -> bool {
        let needle = self.search.to_lowercase();
        let text = contains_lower(&listing.program.title, &needle)
            || contains_lower(&listing.university_name, &needle);
        text && exact(self.country.as_ref(), &listing.country)
            && exact(self.language.as_ref(), &listing.program.language)
    }

    #[must_use]
    pub fn apply(&self, listings: Vec<ProgramListing>) -> Vec<ProgramListing> {
        listings.into_iter().filter(|l| self.matches(l)).collect()
    }
}

/// Admin catalog search.
#[derive(Debug, Clone, Default)]
pub struct UniversityFilter {
    /// Case-insensitive substring of name, description or any program title.
    pub search: String,
    pub country: Option<String>,
}

impl UniversityFilter {
    #[must_use]
    pub fn matches(&self, university: &University) -> bool {
        let needle = self.search.to_lowercase();
        let text = contains_lower(&university.name, &needle)
            || contains_lower(&university.description, &needle)
            || university
                .programs
                .iter()
                .any(|p| contains_lower(&p.title, &needle));
        text && exact(self.country.as_ref(), &university.country)
    }

    #[must_use]
    pub fn apply<'a>(&self, records: &'a [University]) -> Vec<&'a University> {
        records.iter().filter(|u| self.matches(u)).collect()
    }
}

/// Sorted distinct countries.
#[must_use]
pub fn countries(records: &[University]) -> Vec<String> {
    records
        .iter()
        .map(|u| u.country.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted distinct program languages.
#[must_use]
pub fn languages(records: &[University]) -> Vec<String> {
    records
        .iter()
        .flat_map(|u| u.programs.iter().map(|p| p.language.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub universities: usize,
    pub programs: usize,
    pub countries: usize,
}

#[must_use]
pub fn stats(records: &[University]) -> CatalogStats {
    CatalogStats {
        universities: records.len(),
        programs: records.iter().map(|u| u.programs.len()).sum(),
        countries: records.iter().map(|u| u.country.as_str()).collect::<BTreeSet<_>>().len(),
    }
}

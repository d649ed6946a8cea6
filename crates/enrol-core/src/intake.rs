//! Application intake and review.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::catalog;
use crate::error::ErrorCode;
use crate::form::{self, FieldErrors};
use crate::model::{Application, ApplicationStatus, Document, University};
use crate::store::medium::KvMedium;
use crate::store::{ApplicationStore, StoreError};

/// Errors from intake and review operations.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("program not found: '{0}'")]
    ProgramNotFound(String),

    #[error("invalid application: {0}")]
    Invalid(FieldErrors),

    #[error("application not found: '{0}'")]
    NotFound(String),

    #[error("note must not be empty")]
    EmptyNote,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntakeError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ProgramNotFound(_) => ErrorCode::ProgramNotFound,
            Self::Invalid(_) | Self::EmptyNote => ErrorCode::ValidationFailed,
            Self::NotFound(_) => ErrorCode::RecordNotFound,
            Self::Store(err) => err.code(),
        }
    }
}

/// What a student fills in on the application page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationDraft {
    pub student_name: String,
    pub email: String,
    pub phone: String,
    /// Attached filenames. Contents are never stored.
    pub documents: Vec<String>,
}

/// Submit an application for the program addressed by `program_id`.
///
/// The new record is appended to the existing applications and persisted.
/// University and program names are copied verbatim from the catalog.
pub fn submit<M: KvMedium>(
    universities: &[University],
    store: &mut ApplicationStore<M>,
    program_id: &str,
    draft: ApplicationDraft,
) -> Result<Application, IntakeError> {
    let (university, program) = catalog::resolve_program(universities, program_id)
        .map_err(|_| IntakeError::ProgramNotFound(program_id.to_string()))?;

    let errors =
        form::validate_application(&draft.student_name, &draft.email, &draft.phone, &draft.documents);
    if !errors.is_empty() {
        return Err(IntakeError::Invalid(errors));
    }

    let application = Application {
        id: uuid::Uuid::new_v4().to_string(),
        student_name: draft.student_name,
        email: draft.email,
        phone: draft.phone,
        program: program.title.clone(),
        university: university.name.clone(),
        status: ApplicationStatus::Pending,
        submitted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        documents: draft.documents.into_iter().map(Document::submitted).collect(),
        notes: String::new(),
    };

    let mut records = store.records().to_vec();
    records.push(application.clone());
    store.replace(records)?;

    tracing::info!(
        id = %application.id,
        university = %application.university,
        program = %application.program,
        "application submitted"
    );
    Ok(application)
}

/// Look an application up by id.
pub fn find_application<'a>(
    records: &'a [Application],
    id: &str,
) -> Result<&'a Application, IntakeError> {
    records
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| IntakeError::NotFound(id.to_string()))
}

fn edit<M: KvMedium>(
    store: &mut ApplicationStore<M>,
    id: &str,
    change: impl FnOnce(&mut Application),
) -> Result<Application, IntakeError> {
    let mut records = store.records().to_vec();
    let target = records
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| IntakeError::NotFound(id.to_string()))?;
    change(target);
    let updated = target.clone();
    store.replace(records)?;
    Ok(updated)
}

/// Move an application to `status`.
pub fn set_status<M: KvMedium>(
    store: &mut ApplicationStore<M>,
    id: &str,
    status: ApplicationStatus,
) -> Result<Application, IntakeError> {
    let updated = edit(store, id, |app| app.status = status)?;
    tracing::info!(id, %status, "application status changed");
    Ok(updated)
}

/// Append a reviewer note. Blank notes are rejected.
pub fn add_note<M: KvMedium>(
    store: &mut ApplicationStore<M>,
    id: &str,
    note: &str,
) -> Result<Application, IntakeError> {
    if !form::required(note) {
        return Err(IntakeError::EmptyNote);
    }
    let updated = edit(store, id, |app| app.append_note(note))?;
    tracing::info!(id, "note added");
    Ok(updated)
}

/// Review-list search.
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    /// Case-insensitive substring of student name, email or program.
    pub search: String,
    pub status: Option<ApplicationStatus>,
}

impl ApplicationFilter {
    #[must_use]
    pub fn matches(&self, application: &Application) -> bool {
        let needle = self.search.to_lowercase();
        let text = [&application.student_name, &application.email, &application.program]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
        text && self.status.is_none_or(|status| application.status == status)
    }

    #[must_use]
    pub fn apply<'a>(&self, records: &'a [Application]) -> Vec<&'a Application> {
        records.iter().filter(|a| self.matches(a)).collect()
    }
}

/// Why an application no longer resolves against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanReason {
    UniversityMissing,
    ProgramMissing,
}

/// An application whose snapshot strings no longer match the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Orphan {
    pub id: String,
    pub student_name: String,
    pub university: String,
    pub program: String,
    pub reason: OrphanReason,
}

/// Applications whose university or program was renamed or deleted.
#[must_use]
pub fn orphans(applications: &[Application], universities: &[University]) -> Vec<Orphan> {
    applications
        .iter()
        .filter_map(|app| {
            let reason = match universities.iter().find(|u| u.name == app.university) {
                None => OrphanReason::UniversityMissing,
                Some(uni) if uni.program(&app.program).is_none() => OrphanReason::ProgramMissing,
                Some(_) => return None,
            };
            Some(Orphan {
                id: app.id.clone(),
                student_name: app.student_name.clone(),
                university: app.university.clone(),
                program: app.program.clone(),
                reason,
            })
        })
        .collect()
}

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{ParseEnumError, normalize};

/// Review states of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewing,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Reviewing,
        Self::Accepted,
        Self::Rejected,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseEnumError {
                expected: "status",
                got: s.to_string(),
            })
    }
}

/// An attached document. Only the filename is kept; `url` is a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub url: String,
}

impl Document {
    pub const PLACEHOLDER_URL: &'static str = "#";

    /// A submitted file, recorded by name only.
    pub fn submitted(name: impl Into<String>) -> Self {
        Self {
            kind: "document".to_string(),
            name: name.into(),
            url: Self::PLACEHOLDER_URL.to_string(),
        }
    }
}

/// An application as persisted under the `applications` key.
///
/// `program` and `university` are snapshots of the display strings at
/// submission time, not references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub program: String,
    #[serde(default)]
    pub university: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub submitted_at: String,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub notes: String,
}

impl Application {
    /// Append a note, newline-separated from any existing notes.
    pub fn append_note(&mut self, note: &str) {
        if self.notes.is_empty() {
            self.notes = note.to_string();
        } else {
            self.notes.push('\n');
            self.notes.push_str(note);
        }
    }
}

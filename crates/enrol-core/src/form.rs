//! Submit-time form validation.
//!
//! Validators are pure: they take the submitted values and return an error
//! map keyed by field name. An empty map means the form may be submitted.
//! Maps serialize with the same field names the persisted records use.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::model::{Program, University};

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

static PHONE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").ok());

/// Non-empty after trimming.
#[must_use]
pub fn required(value: &str) -> bool {
    !value.trim().is_empty()
}

/// `local@domain.tld` with no whitespace and exactly one `@` before the dot.
#[must_use]
pub fn email(value: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(value))
}

/// E.164-like number; whitespace anywhere is ignored.
#[must_use]
pub fn phone(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE.as_ref().is_some_and(|re| re.is_match(&compact))
}

/// Field name to message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, &'static str>);

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    fn insert(&mut self, field: &'static str, message: &'static str) {
        self.0.insert(field, message);
    }

    fn require(&mut self, field: &'static str, value: &str, message: &'static str) {
        if !required(value) {
            self.insert(field, message);
        }
    }

    fn contact(&mut self, name_field: &'static str, name: &str, email_value: &str, phone_value: &str) {
        self.require(name_field, name, "Full name is required");

        if !required(email_value) {
            self.insert("email", "Email is required");
        } else if !email(email_value) {
            self.insert("email", "Invalid email format");
        }

        if !required(phone_value) {
            self.insert("phone", "Phone number is required");
        } else if !phone(phone_value) {
            self.insert("phone", "Invalid phone format (e.g., +371 12345678)");
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Program errors on a university form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProgramErrors {
    /// The program list is empty.
    Missing(&'static str),
    /// Field errors keyed by program index. Valid programs are absent.
    PerProgram(BTreeMap<usize, FieldErrors>),
}

/// Errors from [`validate_university`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UniversityErrors {
    #[serde(flatten)]
    pub fields: FieldErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub programs: Option<ProgramErrors>,
}

impl UniversityErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.programs.is_none()
    }
}

impl fmt::Display for UniversityErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields)?;
        let sep = if self.fields.is_empty() { "" } else { "; " };
        match &self.programs {
            None => Ok(()),
            Some(ProgramErrors::Missing(message)) => write!(f, "{sep}programs: {message}"),
            Some(ProgramErrors::PerProgram(per)) => {
                let mut sep = sep;
                for (index, errors) in per {
                    for (field, message) in errors.iter() {
                        write!(f, "{sep}programs[{index}].{field}: {message}")?;
                        sep = "; ";
                    }
                }
                Ok(())
            }
        }
    }
}

fn validate_program(program: &Program) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.require("title", &program.title, "Program title is required");
    errors.require("duration", &program.duration, "Duration is required");
    errors.require("language", &program.language, "Language is required");
    errors.require("tuition", &program.tuition, "Tuition is required");
    errors.require("intake", &program.intake, "Intake is required");
    errors
}

/// Validate a university before it is added or saved.
#[must_use]
pub fn validate_university(university: &University) -> UniversityErrors {
    let mut fields = FieldErrors::default();
    fields.require("name", &university.name, "University name is required");
    fields.require("location", &university.location, "Location is required");
    fields.require("country", &university.country, "Country is required");
    fields.require("description", &university.description, "Description is required");

    let programs = if university.programs.is_empty() {
        Some(ProgramErrors::Missing("At least one program is required"))
    } else {
        let per: BTreeMap<usize, FieldErrors> = university
            .programs
            .iter()
            .enumerate()
            .map(|(index, program)| (index, validate_program(program)))
            .filter(|(_, errors)| !errors.is_empty())
            .collect();
        (!per.is_empty()).then_some(ProgramErrors::PerProgram(per))
    };

    UniversityErrors { fields, programs }
}

/// Validate a student application form. `documents` are the attached filenames.
#[must_use]
pub fn validate_application(
    student_name: &str,
    email_value: &str,
    phone_value: &str,
    documents: &[String],
) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.contact("studentName", student_name, email_value, phone_value);
    if documents.is_empty() {
        errors.insert("documents", "At least one document is required");
    }
    errors
}

/// Validate the live-support contact form.
#[must_use]
pub fn validate_contact(full_name: &str, email_value: &str, phone_value: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.contact("fullName", full_name, email_value, phone_value);
    errors
}

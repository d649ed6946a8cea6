use serde::{Deserialize, Serialize};
use std::fmt;

/// A study program offered by a university. Identity is positional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Program {
    pub title: String,
    pub duration: String,
    pub language: String,
    pub tuition: String,
    pub intake: String,
}

impl Program {
    pub fn new(
        title: impl Into<String>,
        duration: impl Into<String>,
        language: impl Into<String>,
        tuition: impl Into<String>,
        intake: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            duration: duration.into(),
            language: language.into(),
            tuition: tuition.into(),
            intake: intake.into(),
        }
    }
}

/// A university record as persisted under the `universities` key.
///
/// `id` is absent on records written before stable ids existed; such
/// records are addressed by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct University {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub logo: String,
    pub description: String,
    pub location: String,
    pub country: String,
    pub programs: Vec<Program>,
    pub features: Vec<String>,
}

impl University {
    /// Generate a fresh stable id for a new record.
    #[must_use]
    pub fn new_id() -> String {
        let raw = uuid::Uuid::new_v4().simple().to_string();
        format!("uni-{}", &raw[..12])
    }

    /// Identity key used to address this record in edits and deletes.
    #[must_use]
    pub fn key(&self) -> RecordKey {
        if self.id.trim().is_empty() {
            RecordKey::Name(self.name.clone())
        } else {
            RecordKey::Id(self.id.clone())
        }
    }

    /// Find a program by exact title.
    #[must_use]
    pub fn program(&self, title: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.title == title)
    }
}

/// Captured identity of a university.
///
/// Taken from the record *before* an edit is applied, so renaming a record
/// still replaces the original element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "lowercase")]
pub enum RecordKey {
    Id(String),
    Name(String),
}

impl RecordKey {
    /// Whether `university` is the record this key was captured from.
    #[must_use]
    pub fn matches(&self, university: &University) -> bool {
        match self {
            Self::Id(id) => university.id == *id,
            Self::Name(name) => university.id.trim().is_empty() && university.name == *name,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id '{id}'"),
            Self::Name(name) => write!(f, "name '{name}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> University {
        University {
            name: name.to_string(),
            ..University::default()
        }
    }

    #[test]
    fn key_prefers_id() {
        let mut uni = named("EKA");
        assert_eq!(uni.key(), RecordKey::Name("EKA".into()));
        uni.id = "uni-1".into();
        assert_eq!(uni.key(), RecordKey::Id("uni-1".into()));
    }

    #[test]
    fn name_key_does_not_match_records_with_ids() {
        let mut uni = named("EKA");
        uni.id = "uni-1".into();
        assert!(!RecordKey::Name("EKA".into()).matches(&uni));
        assert!(RecordKey::Id("uni-1".into()).matches(&uni));
    }

    #[test]
    fn new_ids_are_prefixed_and_distinct() {
        let a = University::new_id();
        let b = University::new_id();
        assert!(a.starts_with("uni-"));
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
    }

    #[test]
    fn legacy_record_without_id_deserializes() {
        let json = r#"{"name":"TTI","programs":[{"title":"Aviation Management"}]}"#;
        let uni: University = serde_json::from_str(json).expect("parse");
        assert!(uni.id.is_empty());
        assert_eq!(uni.programs[0].title, "Aviation Management");
        assert!(uni.programs[0].intake.is_empty());
        assert!(uni.features.is_empty());
    }

    #[test]
    fn empty_id_is_not_serialized() {
        let value = serde_json::to_value(named("KTU")).expect("serialize");
        assert!(value.get("id").is_none());
        assert_eq!(value["name"], "KTU");
    }

    #[test]
    fn program_lookup_is_exact() {
        let mut uni = named("KTU");
        uni.programs.push(Program::new(
            "Civil Engineering",
            "4 years",
            "English",
            "€3,800/year",
            "September",
        ));
        assert!(uni.program("Civil Engineering").is_some());
        assert!(uni.program("civil engineering").is_none());
    }
}

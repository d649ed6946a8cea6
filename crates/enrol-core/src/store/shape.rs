//! Structural checks on raw collection values.
//!
//! Shape validation only asks whether the required fields exist with the
//! required container kinds. Any failing element rejects the whole value.

use serde_json::Value;
use std::fmt;

use crate::model::ApplicationStatus;

/// Why a value failed shape or record validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError {
    /// Index of the offending element, `None` for whole-value failures.
    pub index: Option<usize>,
    pub reason: String,
}

impl ShapeError {
    pub fn whole(reason: impl Into<String>) -> Self {
        Self {
            index: None,
            reason: reason.into(),
        }
    }

    pub fn at(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "element {index}: {}", self.reason),
            None => f.write_str(&self.reason),
        }
    }
}

impl std::error::Error for ShapeError {}

fn elements(value: &Value) -> Result<&[Value], ShapeError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ShapeError::whole(format!("expected an array, found {}", kind_of(value))))
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Universities: an array of objects, each with `name` and an array `programs`.
pub fn universities(value: &Value) -> Result<(), ShapeError> {
    for (index, item) in elements(value)?.iter().enumerate() {
        let Some(object) = item.as_object() else {
            return Err(ShapeError::at(
                index,
                format!("expected an object, found {}", kind_of(item)),
            ));
        };
        if !object.contains_key("name") {
            return Err(ShapeError::at(index, "missing 'name'"));
        }
        match object.get("programs") {
            Some(Value::Array(_)) => {}
            Some(other) => {
                return Err(ShapeError::at(
                    index,
                    format!("'programs' must be an array, found {}", kind_of(other)),
                ));
            }
            None => return Err(ShapeError::at(index, "missing 'programs'")),
        }
    }
    Ok(())
}

/// Applications: an array of objects, each with a string `id` and a known `status`.
pub fn applications(value: &Value) -> Result<(), ShapeError> {
    for (index, item) in elements(value)?.iter().enumerate() {
        let Some(object) = item.as_object() else {
            return Err(ShapeError::at(
                index,
                format!("expected an object, found {}", kind_of(item)),
            ));
        };
        if !matches!(object.get("id"), Some(Value::String(_))) {
            return Err(ShapeError::at(index, "'id' must be a string"));
        }
        let known = object
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(|s| ApplicationStatus::ALL.iter().any(|st| st.as_str() == s));
        if !known {
            return Err(ShapeError::at(index, "'status' must be one of pending, reviewing, accepted, rejected"));
        }
    }
    Ok(())
}

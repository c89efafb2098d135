//! Tagged response values.
//!
//! Response payloads are schemaless at the storage layer (a JSON column),
//! but every value entering the Response Store is checked here against the
//! declared type and constraints of the template field it answers.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::template::{FieldType, TemplateField};

/// A typed response value, chosen per the template field's declared type.
///
/// Serializes untagged so stored JSON stays the plain scalar/array the
/// original wire format used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Parse a raw JSON value into a typed value.
    pub fn from_json(raw: &serde_json::Value) -> Result<Self, CoreError> {
        serde_json::from_value(raw.clone()).map_err(|e| {
            CoreError::Validation(format!("Unsupported response value shape: {e}"))
        })
    }

    /// True when the value does not count as an answer (empty string or
    /// empty list). Mirrors the completion rule: unanswered required
    /// fields include those saved as `""`.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }
}

/// Check that `value` is acceptable for `field`.
///
/// Type compatibility first, then the field's declared constraints.
/// `date` and `file` fields carry string payloads (an ISO date, a stored
/// object URL); `select` values must be one of the declared options.
pub fn validate_value(field: &TemplateField, value: &FieldValue) -> Result<(), CoreError> {
    let ok = match (field.field_type, value) {
        (FieldType::Text | FieldType::Textarea, FieldValue::Text(_)) => true,
        (FieldType::Number, FieldValue::Number(_)) => true,
        (FieldType::Boolean, FieldValue::Bool(_)) => true,
        (FieldType::Date | FieldType::File, FieldValue::Text(_)) => true,
        (FieldType::Select, FieldValue::Text(_)) => true,
        (FieldType::MultiSelect, FieldValue::List(_)) => true,
        _ => false,
    };
    if !ok {
        return Err(CoreError::Validation(format!(
            "Field '{}' expects a {} value",
            field.id,
            field.field_type.as_str()
        )));
    }

    if let (FieldType::Select, FieldValue::Text(chosen)) = (field.field_type, value) {
        if !chosen.is_empty() && !option_values(field).any(|v| v == chosen) {
            return Err(CoreError::Validation(format!(
                "'{chosen}' is not an option for field '{}'",
                field.id
            )));
        }
    }
    if let (FieldType::MultiSelect, FieldValue::List(chosen)) = (field.field_type, value) {
        for item in chosen {
            if !option_values(field).any(|v| v == item) {
                return Err(CoreError::Validation(format!(
                    "'{item}' is not an option for field '{}'",
                    field.id
                )));
            }
        }
    }

    if let Some(rules) = &field.validation {
        apply_constraints(field, rules, value)?;
    }

    Ok(())
}

fn option_values(field: &TemplateField) -> impl Iterator<Item = &str> {
    field
        .options
        .iter()
        .flatten()
        .map(|o| o.value.as_str())
}

fn apply_constraints(
    field: &TemplateField,
    rules: &crate::template::FieldValidation,
    value: &FieldValue,
) -> Result<(), CoreError> {
    match value {
        FieldValue::Text(s) if !s.is_empty() => {
            if let Some(min) = rules.min_length {
                if s.chars().count() < min {
                    return Err(CoreError::Validation(format!(
                        "Field '{}' requires at least {min} characters",
                        field.id
                    )));
                }
            }
            if let Some(max) = rules.max_length {
                if s.chars().count() > max {
                    return Err(CoreError::Validation(format!(
                        "Field '{}' allows at most {max} characters",
                        field.id
                    )));
                }
            }
            if let Some(pattern) = &rules.pattern {
                let re = regex::Regex::new(pattern).map_err(|e| {
                    CoreError::Validation(format!(
                        "Field '{}' has an invalid pattern: {e}",
                        field.id
                    ))
                })?;
                if !re.is_match(s) {
                    return Err(CoreError::Validation(format!(
                        "Field '{}' does not match the expected format",
                        field.id
                    )));
                }
            }
        }
        FieldValue::Number(n) => {
            if let Some(min) = rules.min {
                if *n < min {
                    return Err(CoreError::Validation(format!(
                        "Field '{}' must be at least {min}",
                        field.id
                    )));
                }
            }
            if let Some(max) = rules.max {
                if *n > max {
                    return Err(CoreError::Validation(format!(
                        "Field '{}' must be at most {max}",
                        field.id
                    )));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

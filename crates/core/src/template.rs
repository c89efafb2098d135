//! Template step and field definitions.
//!
//! A template's `steps` column is a JSON document: an ordered list of steps,
//! each an ordered list of field descriptors. This module owns the typed
//! view of that document plus the structural validation applied whenever a
//! steps document enters the system. Everything outside the completion
//! calculation and the rendering layer treats the document as opaque.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Field types
// ---------------------------------------------------------------------------

/// Supported field types for the template engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Textarea,
    Select,
    MultiSelect,
    Number,
    Date,
    File,
    Boolean,
}

impl FieldType {
    /// Wire-format name of the type, as stored in the steps document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::MultiSelect => "multi-select",
            Self::Number => "number",
            Self::Date => "date",
            Self::File => "file",
            Self::Boolean => "boolean",
        }
    }
}

// ---------------------------------------------------------------------------
// Field and step descriptors
// ---------------------------------------------------------------------------

/// Validation constraints attachable to a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regular expression the (string) value must match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// An option for `select` / `multi-select` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

/// A single field within a template step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

/// A step (page) within an onboarding template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateStep {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<TemplateField>,
}

/// The full steps document stored in the template's `steps` JSON column.
pub type TemplateSteps = Vec<TemplateStep>;

// ---------------------------------------------------------------------------
// Parsing and validation
// ---------------------------------------------------------------------------

/// Parse a raw steps JSON document into typed steps.
///
/// Used at the boundary where a template row's JSON column re-enters the
/// engine. A document that does not deserialize is a malformed template.
pub fn parse_steps(raw: &serde_json::Value) -> Result<TemplateSteps, CoreError> {
    serde_json::from_value(raw.clone())
        .map_err(|e| CoreError::Validation(format!("Malformed template steps: {e}")))
}

/// Structurally validate a steps document before it is persisted.
///
/// Checks: at least one step, non-empty unique step ids, non-empty field
/// ids unique within their step, and options present for select fields.
pub fn validate_steps(steps: &[TemplateStep]) -> Result<(), CoreError> {
    if steps.is_empty() {
        return Err(CoreError::Validation(
            "Template must define at least one step".into(),
        ));
    }

    let mut step_ids = std::collections::HashSet::new();
    for step in steps {
        if step.id.trim().is_empty() {
            return Err(CoreError::Validation("Step id must not be empty".into()));
        }
        if !step_ids.insert(step.id.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate step id '{}'",
                step.id
            )));
        }

        let mut field_ids = std::collections::HashSet::new();
        for field in &step.fields {
            if field.id.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "Field id must not be empty (step '{}')",
                    step.id
                )));
            }
            if !field_ids.insert(field.id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate field id '{}' in step '{}'",
                    field.id, step.id
                )));
            }
            if matches!(field.field_type, FieldType::Select | FieldType::MultiSelect)
                && field.options.as_ref().map_or(true, |o| o.is_empty())
            {
                return Err(CoreError::Validation(format!(
                    "Field '{}' is a {} field and must declare options",
                    field.id,
                    field.field_type.as_str()
                )));
            }
        }
    }

    Ok(())
}

/// Find a field descriptor by (step_id, field_id).
pub fn find_field<'a>(
    steps: &'a [TemplateStep],
    step_id: &str,
    field_id: &str,
) -> Option<&'a TemplateField> {
    steps
        .iter()
        .find(|s| s.id == step_id)?
        .fields
        .iter()
        .find(|f| f.id == field_id)
}

/// All required (step_id, field_id) pairs across the template, in order.
pub fn required_fields(steps: &[TemplateStep]) -> Vec<(&str, &str)> {
    steps
        .iter()
        .flat_map(|s| {
            s.fields
                .iter()
                .filter(|f| f.required)
                .map(move |f| (s.id.as_str(), f.id.as_str()))
        })
        .collect()
}

/// Required fields of type `file`, counted by the risk scorer.
pub fn required_file_fields(steps: &[TemplateStep]) -> usize {
    steps
        .iter()
        .flat_map(|s| &s.fields)
        .filter(|f| f.required && f.field_type == FieldType::File)
        .count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

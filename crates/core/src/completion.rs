//! Completion percentage calculation.
//!
//! The percentage is a derived value: answered required fields over total
//! required fields across the pinned template's steps, rounded to a whole
//! number. It is persisted on the session for display but recomputed from
//! stored responses whenever it matters.

use crate::template::{required_fields, TemplateStep};
use crate::value::FieldValue;

/// One stored answer, identified by its (step, field) pair.
#[derive(Debug, Clone)]
pub struct AnsweredField {
    pub step_id: String,
    pub field_id: String,
    pub value: FieldValue,
}

/// Compute the completion percentage for a session.
///
/// A required field counts as answered when a response exists for its
/// (step_id, field_id) pair and the value is non-empty. A template with no
/// required fields is trivially 100% complete. The result is always in
/// `0..=100`.
pub fn completion_percentage(steps: &[TemplateStep], answers: &[AnsweredField]) -> u8 {
    let required = required_fields(steps);
    if required.is_empty() {
        return 100;
    }

    let filled = required
        .iter()
        .filter(|(step_id, field_id)| {
            answers.iter().any(|a| {
                a.step_id == *step_id && a.field_id == *field_id && !a.value.is_empty()
            })
        })
        .count();

    let pct = (filled as f64 / required.len() as f64) * 100.0;
    pct.round().clamp(0.0, 100.0) as u8
}

/// Required (step_id, field_id) pairs that have no non-empty answer yet.
/// Feeds the risk scorer and the admin review view.
pub fn missing_required<'a>(
    steps: &'a [TemplateStep],
    answers: &[AnsweredField],
) -> Vec<(&'a str, &'a str)> {
    required_fields(steps)
        .into_iter()
        .filter(|(step_id, field_id)| {
            !answers.iter().any(|a| {
                a.step_id == *step_id && a.field_id == *field_id && !a.value.is_empty()
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

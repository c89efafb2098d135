//! Risk scoring engine.
//!
//! A pure, deterministic function over session metadata, recomputed on
//! every admin view and never persisted as a source of truth. Four factors
//! contribute: missing required fields, missing required file uploads,
//! staleness of an incomplete session, and intrinsic service complexity.
//!
//! The exact weights are an operational knob ([`RiskWeights`]); the binding
//! contract is monotonicity: all else equal, an older session never scores
//! lower and a more complete session never scores higher.

use serde::Serialize;

use crate::types::Timestamp;

/// Coarse classification derived from the numeric score, for admin triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

/// The computed score, its band, and human-readable contributing factors.
#[derive(Debug, Clone, Serialize)]
pub struct RiskScore {
    pub score: u8,
    pub band: RiskBand,
    pub factors: Vec<String>,
}

/// Weight configuration for the scorer.
///
/// Defaults reproduce the production constants: missing fields contribute
/// up to 40 points, missing files and staleness up to 20 each, and
/// high-complexity service types add a flat 10. Bands cut at 30 and 60.
#[derive(Debug, Clone)]
pub struct RiskWeights {
    pub missing_fields_max: f64,
    pub missing_files_max: f64,
    pub staleness_max: f64,
    /// Days of grace before an incomplete session starts accruing
    /// staleness points.
    pub staleness_grace_days: i64,
    /// Days over which staleness ramps from zero to `staleness_max`.
    pub staleness_window_days: i64,
    pub complexity_weight: f64,
    pub medium_threshold: f64,
    pub high_threshold: f64,
    /// Service types that carry intrinsic complexity risk (lowercase).
    pub high_complexity_services: Vec<String>,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            missing_fields_max: 40.0,
            missing_files_max: 20.0,
            staleness_max: 20.0,
            staleness_grace_days: 7,
            staleness_window_days: 14,
            complexity_weight: 10.0,
            medium_threshold: 30.0,
            high_threshold: 60.0,
            high_complexity_services: vec![
                "ecommerce".into(),
                "saas".into(),
                "enterprise".into(),
                "ai-ml".into(),
            ],
        }
    }
}

/// Everything the scorer looks at. Callers assemble this from the session,
/// its pinned template, and its stored responses/attachments.
#[derive(Debug, Clone)]
pub struct RiskInput<'a> {
    pub service_type: &'a str,
    pub created_at: Timestamp,
    pub now: Timestamp,
    pub completion_percentage: u8,
    pub required_fields_total: usize,
    pub required_fields_missing: usize,
    pub required_file_fields: usize,
    pub uploaded_file_count: usize,
}

/// Compute the risk score. Deterministic and side-effect-free.
pub fn score(input: &RiskInput<'_>, weights: &RiskWeights) -> RiskScore {
    let mut total = 0.0;
    let mut factors = Vec::new();

    // 1. Missing required fields.
    if input.required_fields_missing > 0 {
        let ratio =
            input.required_fields_missing as f64 / input.required_fields_total.max(1) as f64;
        total += (ratio * weights.missing_fields_max).min(weights.missing_fields_max);
        factors.push(format!(
            "{} required field(s) missing",
            input.required_fields_missing
        ));
    }

    // 2. Missing required file uploads.
    if input.required_file_fields > 0 {
        let missing = input
            .required_file_fields
            .saturating_sub(input.uploaded_file_count);
        if missing > 0 {
            let ratio = missing as f64 / input.required_file_fields as f64;
            total += (ratio * weights.missing_files_max).min(weights.missing_files_max);
            factors.push(format!("{missing} required file(s) not uploaded"));
        }
    }

    // 3. Staleness: incomplete sessions accrue points after the grace
    //    period, ramping linearly over the window and capping at max.
    let age_days = (input.now - input.created_at).num_days();
    if age_days > weights.staleness_grace_days && input.completion_percentage < 100 {
        let over = (age_days - weights.staleness_grace_days) as f64;
        let ramp = over / weights.staleness_window_days.max(1) as f64;
        total += (ramp * weights.staleness_max).min(weights.staleness_max);
        factors.push(format!("{age_days} days since creation, still incomplete"));
    }

    // 4. Intrinsic service complexity.
    if weights
        .high_complexity_services
        .iter()
        .any(|s| s == &input.service_type.to_lowercase())
    {
        total += weights.complexity_weight;
        factors.push(format!(
            "High-complexity service type: {}",
            input.service_type
        ));
    }

    let band = if total >= weights.high_threshold {
        RiskBand::High
    } else if total >= weights.medium_threshold {
        RiskBand::Medium
    } else {
        RiskBand::Low
    };

    RiskScore {
        score: total.round().clamp(0.0, 100.0) as u8,
        band,
        factors,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn input(now: Timestamp) -> RiskInput<'static> {
        RiskInput {
            service_type: "branding",
            created_at: now,
            now,
            completion_percentage: 100,
            required_fields_total: 4,
            required_fields_missing: 0,
            required_file_fields: 0,
            uploaded_file_count: 0,
        }
    }

    #[test]
    fn fresh_complete_session_scores_zero() {
        let now = Utc::now();
        let result = score(&input(now), &RiskWeights::default());
        assert_eq!(result.score, 0);
        assert_eq!(result.band, RiskBand::Low);
        assert!(result.factors.is_empty());
    }

    #[test]
    fn missing_fields_raise_the_score() {
        let now = Utc::now();
        let mut i = input(now);
        i.required_fields_missing = 2;
        i.completion_percentage = 50;
        let result = score(&i, &RiskWeights::default());
        // 2 of 4 missing → half of the 40-point factor.
        assert_eq!(result.score, 20);
        assert_eq!(result.factors.len(), 1);
    }

    #[test]
    fn all_fields_missing_caps_the_factor() {
        let now = Utc::now();
        let mut i = input(now);
        i.required_fields_missing = 4;
        i.completion_percentage = 0;
        let result = score(&i, &RiskWeights::default());
        assert_eq!(result.score, 40);
        assert_eq!(result.band, RiskBand::Medium);
    }

    #[test]
    fn missing_files_contribute() {
        let now = Utc::now();
        let mut i = input(now);
        i.required_file_fields = 2;
        i.uploaded_file_count = 1;
        let result = score(&i, &RiskWeights::default());
        assert_eq!(result.score, 10);
    }

    #[test]
    fn extra_uploads_never_go_negative() {
        let now = Utc::now();
        let mut i = input(now);
        i.required_file_fields = 1;
        i.uploaded_file_count = 5;
        assert_eq!(score(&i, &RiskWeights::default()).score, 0);
    }

    #[test]
    fn staleness_needs_both_age_and_incompleteness() {
        let now = Utc::now();
        let weights = RiskWeights::default();

        // Old but complete: no staleness points.
        let mut complete = input(now);
        complete.created_at = now - Duration::days(30);
        assert_eq!(score(&complete, &weights).score, 0);

        // Recent and incomplete: still in the grace period.
        let mut recent = input(now);
        recent.completion_percentage = 50;
        recent.required_fields_missing = 2;
        let base = score(&recent, &weights).score;

        // Old and incomplete: staleness added on top.
        let mut old = recent.clone();
        old.created_at = now - Duration::days(21);
        let aged = score(&old, &weights).score;
        assert!(aged > base);
        // 14 days past grace saturates the 20-point ramp.
        assert_eq!(aged, base + 20);
    }

    #[test]
    fn complexity_bonus_is_case_insensitive() {
        let now = Utc::now();
        let mut i = input(now);
        i.service_type = "SaaS";
        let result = score(&i, &RiskWeights::default());
        assert_eq!(result.score, 10);
        assert_eq!(result.factors.len(), 1);
    }

    #[test]
    fn bands_cut_at_thresholds() {
        let now = Utc::now();
        let weights = RiskWeights::default();

        let mut high = input(now);
        high.service_type = "enterprise";
        high.required_fields_missing = 4;
        high.completion_percentage = 0;
        high.required_file_fields = 1;
        high.created_at = now - Duration::days(30);
        // 40 + 20 + 20 + 10 = 90.
        let result = score(&high, &weights);
        assert_eq!(result.score, 90);
        assert_eq!(result.band, RiskBand::High);
        assert_eq!(result.factors.len(), 4);
    }

    #[test]
    fn monotone_nondecreasing_in_age() {
        let now = Utc::now();
        let weights = RiskWeights::default();
        let mut previous = 0;
        for days in 0..40 {
            let mut i = input(now);
            i.completion_percentage = 50;
            i.required_fields_missing = 2;
            i.created_at = now - Duration::days(days);
            let s = score(&i, &weights).score;
            assert!(
                s >= previous,
                "score dropped from {previous} to {s} at age {days}"
            );
            previous = s;
        }
    }

    #[test]
    fn monotone_nonincreasing_in_completion() {
        let now = Utc::now();
        let weights = RiskWeights::default();
        let mut previous = u8::MAX;
        for answered in 0..=4usize {
            let mut i = input(now);
            i.created_at = now - Duration::days(21);
            i.required_fields_missing = 4 - answered;
            i.completion_percentage = (answered * 25) as u8;
            let s = score(&i, &weights).score;
            assert!(
                s <= previous,
                "score rose from {previous} to {s} at {answered} answers"
            );
            previous = s;
        }
    }

    #[test]
    fn deterministic_for_equal_inputs() {
        let now = Utc::now();
        let mut i = input(now);
        i.required_fields_missing = 1;
        i.completion_percentage = 75;
        let a = score(&i, &RiskWeights::default());
        let b = score(&i, &RiskWeights::default());
        assert_eq!(a.score, b.score);
        assert_eq!(a.factors, b.factors);
    }
}

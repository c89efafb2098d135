//! Engine tunables.

use intake_core::risk::RiskWeights;
use intake_core::upload::MAX_UPLOAD_BYTES;

/// Knobs shared by the session manager and the file gateway. Defaults
/// match production behavior; tests override individual fields.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Days a session stays writable after creation.
    pub session_ttl_days: i64,
    /// Inclusive cap on a single upload's size.
    pub max_upload_bytes: usize,
    /// Risk scoring weights and thresholds.
    pub risk_weights: RiskWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: 14,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            risk_weights: RiskWeights::default(),
        }
    }
}

use crate::types::DbId;

/// Domain error taxonomy for the onboarding engine.
///
/// Every rejected operation maps to exactly one variant so callers can
/// distinguish "your link is no longer usable" (`NotFound` / `InvalidToken`
/// / `Expired` / `Locked`) from "your input was invalid" (`Validation`)
/// from "something went wrong, try again" (`Storage` /
/// `MetadataInconsistency` / `Internal`).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// The onboarding token does not resolve to any session.
    #[error("Invalid onboarding token")]
    InvalidToken,

    /// The session's TTL has elapsed.
    #[error("Onboarding session has expired")]
    Expired,

    /// The session is in a terminal-write-blocking status.
    #[error("Session is locked: {0}")]
    Locked(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The physical object-storage collaborator failed before any metadata
    /// was written. The whole upload is safe to retry.
    #[error("Storage failure: {0}")]
    Storage(String),

    /// The object-storage write succeeded but the metadata record failed,
    /// leaving an orphaned stored object. Surfaced so the caller can retry
    /// the whole operation; the orphan is reconciled out of band.
    #[error("Stored object {url} has no metadata record: {detail}")]
    MetadataInconsistency { url: String, detail: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a locked-session error naming the offending status.
    pub fn locked(status: &str) -> Self {
        Self::Locked(format!("session status is {status}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_helper_names_status() {
        assert_eq!(
            CoreError::locked("COMPLETED").to_string(),
            "Session is locked: session status is COMPLETED"
        );
    }

    #[test]
    fn metadata_inconsistency_reports_orphan_and_cause() {
        let err = CoreError::MetadataInconsistency {
            url: "s3://bucket/obj".into(),
            detail: "insert failed".into(),
        };
        assert_eq!(
            err.to_string(),
            "Stored object s3://bucket/obj has no metadata record: insert failed"
        );
    }
}

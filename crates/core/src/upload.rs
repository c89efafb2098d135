//! Upload validation constants and checks.
//!
//! The allow-list and size cap gate every onboarding upload before any
//! byte reaches the storage collaborator.

use crate::error::CoreError;

/// MIME types accepted for onboarding uploads: images, PDF, Word, Excel.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/svg+xml",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// Maximum upload size: 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Validate a MIME type against the allow-list.
pub fn validate_mime_type(mime_type: &str) -> Result<(), CoreError> {
    if ALLOWED_MIME_TYPES.contains(&mime_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "File type not allowed. Accepted: images, PDF, Word, Excel".into(),
        ))
    }
}

/// Validate an upload's byte length against `max_bytes`.
pub fn validate_size(size_bytes: usize, max_bytes: usize) -> Result<(), CoreError> {
    if size_bytes > max_bytes {
        Err(CoreError::Validation(format!(
            "File too large. Max {} bytes",
            max_bytes
        )))
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

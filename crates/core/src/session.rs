//! Session status state machine.
//!
//! Statuses move forward only (`DRAFT → IN_PROGRESS → COMPLETED →
//! APPROVED`), with two sanctioned exceptions: a lazy transition to
//! `EXPIRED` when the TTL elapses, and an explicit administrative reopen
//! back to `IN_PROGRESS`. Expiry is evaluated at access time against the
//! caller's clock, never by a background sweep.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Status values for an onboarding session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Draft,
    InProgress,
    Completed,
    Approved,
    Expired,
}

impl SessionStatus {
    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "APPROVED" => Ok(Self::Approved),
            "EXPIRED" => Ok(Self::Expired),
            _ => Err(CoreError::Validation(format!(
                "Invalid session status '{s}'. Must be one of: \
                 DRAFT, IN_PROGRESS, COMPLETED, APPROVED, EXPIRED"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Approved => "APPROVED",
            Self::Expired => "EXPIRED",
        }
    }

    /// Locked statuses accept no further response or file writes.
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Completed | Self::Approved)
    }

    /// Terminal statuses end the lifecycle (barring an admin reopen of
    /// an expired session).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Expired)
    }

    /// Whether `self → next` is a sanctioned transition.
    pub fn can_transition(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (*self, next),
            (Draft, InProgress)
                | (InProgress, Completed)
                | (Completed, Approved)
                // Lazy expiry from any non-terminal status.
                | (Draft, Expired)
                | (InProgress, Expired)
                | (Completed, Expired)
                // Administrative reopen.
                | (Completed, InProgress)
                | (Expired, InProgress)
        )
    }

    /// Validate a transition, naming both states on failure.
    pub fn validate_transition(&self, next: SessionStatus) -> Result<(), CoreError> {
        if self.can_transition(next) {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Cannot transition session from {} to {}",
                self.as_str(),
                next.as_str()
            )))
        }
    }
}

/// Lazy expiry check.
///
/// A session reads as expired once `now` passes `expires_at`, regardless of
/// the stored status, unless it is already APPROVED, which is terminal and
/// overrides the clock.
pub fn is_expired(status: SessionStatus, expires_at: Timestamp, now: Timestamp) -> bool {
    if status == SessionStatus::Approved {
        return false;
    }
    status == SessionStatus::Expired || now > expires_at
}

/// Writability guard applied before any response or file write.
///
/// Fails closed: `Locked` for COMPLETED/APPROVED, `Expired` when the TTL
/// has elapsed. Every write path runs this before touching storage.
pub fn guard_writable(
    status: SessionStatus,
    expires_at: Timestamp,
    now: Timestamp,
) -> Result<(), CoreError> {
    if status.is_locked() {
        return Err(CoreError::locked(status.as_str()));
    }
    if is_expired(status, expires_at, now) {
        return Err(CoreError::Expired);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

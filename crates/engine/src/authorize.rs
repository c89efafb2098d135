//! Authorization capability port.
//!
//! The engine never inspects credentials itself. Admin operations
//! receive an [`ActorContext`] produced upstream and ask the injected
//! [`Authorizer`] whether the actor holds the required [`Permission`]
//! within the organization.

use intake_core::types::DbId;
use intake_core::CoreError;

/// Admin-surface capabilities, checked per organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ManageTemplates,
    ManageSessions,
    ViewSessions,
    ViewAuditLog,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManageTemplates => "templates:manage",
            Self::ManageSessions => "sessions:manage",
            Self::ViewSessions => "sessions:view",
            Self::ViewAuditLog => "audit:view",
        }
    }
}

/// Who is performing an admin operation.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub actor_id: DbId,
    pub organization_id: DbId,
}

#[async_trait::async_trait]
pub trait Authorizer: Send + Sync {
    /// Err(`Forbidden`) when the actor lacks the permission; other
    /// variants signal evaluation failure, not denial.
    async fn require(&self, actor: &ActorContext, permission: Permission)
        -> Result<(), CoreError>;
}

/// Grants every permission. For tests and single-tenant deployments that
/// terminate auth at the proxy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait::async_trait]
impl Authorizer for AllowAll {
    async fn require(
        &self,
        _actor: &ActorContext,
        _permission: Permission,
    ) -> Result<(), CoreError> {
        Ok(())
    }
}

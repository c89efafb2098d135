//! Template registry: versioned onboarding templates per organization.

use std::sync::Arc;

use intake_core::template::{parse_steps, validate_steps};
use intake_core::types::DbId;
use intake_core::CoreError;
use intake_db::models::template::{NewTemplate, Template, UpdateTemplate};

use crate::store::TemplateStore;

/// Admin-facing template operations. Structural validation happens here,
/// before anything reaches the store.
#[derive(Clone)]
pub struct TemplateRegistry {
    templates: Arc<dyn TemplateStore>,
}

impl TemplateRegistry {
    pub fn new(templates: Arc<dyn TemplateStore>) -> Self {
        Self { templates }
    }

    /// Create a version-1 active template. Rejects a malformed steps
    /// document and refuses to create a second active template for the
    /// same (organization, service type) pair.
    pub async fn create(&self, input: NewTemplate) -> Result<Template, CoreError> {
        let steps = parse_steps(&input.steps)?;
        validate_steps(&steps)?;

        if self
            .templates
            .find_active(input.organization_id, &input.service_type)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "an active template already exists for service type {}",
                input.service_type
            )));
        }

        self.templates.create(&input).await
    }

    pub async fn get(&self, id: DbId, organization_id: DbId) -> Result<Template, CoreError> {
        self.templates
            .find_by_id(id, organization_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "template",
                id,
            })
    }

    pub async fn list(&self, organization_id: DbId) -> Result<Vec<Template>, CoreError> {
        self.templates.list(organization_id).await
    }

    pub async fn list_active(&self, organization_id: DbId) -> Result<Vec<Template>, CoreError> {
        self.templates.list_active(organization_id).await
    }

    /// Resolve the single active template for a service type.
    pub async fn find_active(
        &self,
        organization_id: DbId,
        service_type: &str,
    ) -> Result<Template, CoreError> {
        self.templates
            .find_active(organization_id, service_type)
            .await?
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "no active template for service type {service_type}"
                ))
            })
    }

    /// Live in-place edit of a template row. The version does not change;
    /// sessions pinned to the row see the new steps on their next load.
    pub async fn update(
        &self,
        id: DbId,
        organization_id: DbId,
        input: UpdateTemplate,
    ) -> Result<Template, CoreError> {
        if let Some(raw) = &input.steps {
            let steps = parse_steps(raw)?;
            validate_steps(&steps)?;
        }
        self.templates
            .update(id, organization_id, &input)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "template",
                id,
            })
    }

    /// Publish a new version: the source row is deactivated and a copy is
    /// inserted at version + 1 as the new active row. Existing sessions
    /// stay pinned to the old row.
    pub async fn publish_version(
        &self,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Template, CoreError> {
        self.templates
            .version(id, organization_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "template",
                id,
            })
    }

    pub async fn delete(&self, id: DbId, organization_id: DbId) -> Result<(), CoreError> {
        if self.templates.delete(id, organization_id).await? {
            Ok(())
        } else {
            Err(CoreError::NotFound {
                entity: "template",
                id,
            })
        }
    }
}

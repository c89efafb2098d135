//! Template registry behavior: validation, single-active rule, versioning.

mod common;

use assert_matches::assert_matches;

use intake_core::CoreError;
use intake_db::models::template::{NewTemplate, UpdateTemplate};

use common::{steps_fixture, template_fixture, Harness, ORG};

#[tokio::test]
async fn create_rejects_malformed_steps() {
    let h = Harness::new();

    let mut input = template_fixture("branding");
    input.steps = serde_json::json!([]);
    let err = h.registry.create(input).await.unwrap_err();
    assert_matches!(err, CoreError::Validation(_));

    let mut input = template_fixture("branding");
    input.steps = serde_json::json!({ "not": "steps" });
    let err = h.registry.create(input).await.unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
}

#[tokio::test]
async fn one_active_template_per_service_type() {
    let h = Harness::new();
    h.registry.create(template_fixture("saas")).await.unwrap();

    let err = h
        .registry
        .create(NewTemplate {
            name: "another".into(),
            ..template_fixture("saas")
        })
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));

    // A different service type is fine.
    h.registry
        .create(template_fixture("branding"))
        .await
        .unwrap();
}

#[tokio::test]
async fn publishing_a_version_leaves_one_active_row() {
    let h = Harness::new();
    let v1 = h.registry.create(template_fixture("saas")).await.unwrap();

    let v2 = h.registry.publish_version(v1.id, ORG).await.unwrap();
    assert_eq!(v2.version, 2);
    assert!(v2.is_active);
    assert_ne!(v2.id, v1.id);

    let all = h.registry.list(ORG).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all.iter().filter(|t| t.is_active).count(), 1);

    let active = h.registry.find_active(ORG, "saas").await.unwrap();
    assert_eq!(active.id, v2.id);
}

#[tokio::test]
async fn sessions_stay_pinned_across_versioning() {
    let h = Harness::new();
    let token = h.seed_session("saas").await;
    let before = h.manager.resolve_by_token(&token).await.unwrap();

    h.registry
        .publish_version(before.template.id, ORG)
        .await
        .unwrap();

    let after = h.manager.resolve_by_token(&token).await.unwrap();
    assert_eq!(after.template.id, before.template.id);
    assert_eq!(after.template.version, 1);
    assert!(!after.template.is_active);
}

#[tokio::test]
async fn in_place_edit_is_visible_to_pinned_sessions() {
    let h = Harness::new();
    let token = h.seed_session("saas").await;
    let before = h.manager.resolve_by_token(&token).await.unwrap();

    let mut steps = steps_fixture();
    steps[0]["title"] = "Company basics".into();
    h.registry
        .update(
            before.template.id,
            ORG,
            UpdateTemplate {
                steps: Some(steps),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let after = h.manager.resolve_by_token(&token).await.unwrap();
    assert_eq!(after.template.version, 1);
    assert_eq!(after.steps().unwrap()[0].title, "Company basics");
}

#[tokio::test]
async fn edits_with_invalid_steps_are_rejected() {
    let h = Harness::new();
    let created = h.registry.create(template_fixture("saas")).await.unwrap();

    let err = h
        .registry
        .update(
            created.id,
            ORG,
            UpdateTemplate {
                steps: Some(serde_json::json!([])),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
}

#[tokio::test]
async fn missing_template_ids_report_not_found() {
    let h = Harness::new();
    assert_matches!(
        h.registry.get(99, ORG).await.unwrap_err(),
        CoreError::NotFound { entity: "template", .. }
    );
    assert_matches!(
        h.registry.publish_version(99, ORG).await.unwrap_err(),
        CoreError::NotFound { .. }
    );
    assert_matches!(
        h.registry.delete(99, ORG).await.unwrap_err(),
        CoreError::NotFound { .. }
    );

    // Wrong organization behaves like a missing row.
    let created = h.registry.create(template_fixture("saas")).await.unwrap();
    assert_matches!(
        h.registry.get(created.id, ORG + 1).await.unwrap_err(),
        CoreError::NotFound { .. }
    );
}

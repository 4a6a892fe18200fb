use config_service::api::error::AppError;
use config_service::entities::{prelude::*, template_tags};
use config_service::infrastructure::{migrations::MigrationRunner, seed};
use config_service::models::environment::{CreateEnvironmentRequest, UpdateEnvironmentRequest};
use config_service::models::tag::{CreateTagRequest, UpdateTagRequest};
use config_service::models::template::{CreateTemplateRequest, UpdateTemplateRequest};
use config_service::models::{ListQuery, Patch};
use config_service::services::environments::EnvironmentService;
use config_service::services::tags::TagService;
use config_service::services::templates::TemplateService;
use sea_orm::{ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use std::time::Duration;

async fn setup_test_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    let db = Database::connect(opt).await.unwrap();
    MigrationRunner::new(db.clone()).up().await.unwrap();
    db
}

fn tag_request(name: &str) -> CreateTagRequest {
    serde_json::from_value(json!({"name": name})).unwrap()
}

fn environment_request(name: &str, slug: &str) -> CreateEnvironmentRequest {
    serde_json::from_value(json!({"name": name, "slug": slug})).unwrap()
}

fn template_request(name: &str, environment_id: i64, tag_ids: Vec<i64>) -> CreateTemplateRequest {
    serde_json::from_value(json!({
        "name": name,
        "format": "json",
        "content": "{\"key\": \"value\"}",
        "version": "1.0.0",
        "environment_id": environment_id,
        "tag_ids": tag_ids,
        "created_by": "tester"
    }))
    .unwrap()
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let db = setup_test_db().await;

    seed::seed_initial_data(&db).await.unwrap();
    let environments = Environments::find().count(&db).await.unwrap();
    let tags = Tags::find().count(&db).await.unwrap();
    assert_eq!(environments, 3);
    assert_eq!(tags, 4);

    seed::seed_initial_data(&db).await.unwrap();
    assert_eq!(Environments::find().count(&db).await.unwrap(), 3);
    assert_eq!(Tags::find().count(&db).await.unwrap(), 4);
}

#[tokio::test]
async fn test_timestamps_on_create_and_update() {
    let db = setup_test_db().await;
    let service = TagService::new(db);

    let created = service.create(tag_request("timestamps")).await.unwrap();
    assert_eq!(created.created_at, created.updated_at);

    tokio::time::sleep(Duration::from_millis(20)).await;

    let updated = service
        .update(
            created.id,
            UpdateTagRequest {
                name: Some("timestamps-renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
async fn test_partial_update_leaves_other_fields() {
    let db = setup_test_db().await;
    let service = EnvironmentService::new(db);

    let created = service
        .create(
            serde_json::from_value(json!({
                "name": "Integration",
                "slug": "integration",
                "description": "shared test cluster",
                "priority": 30
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    let updated = service
        .update(
            created.id,
            UpdateEnvironmentRequest {
                priority: Some(60),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.priority, 60);
    assert_eq!(updated.name, "Integration");
    assert_eq!(updated.slug, "integration");
    assert_eq!(updated.description, "shared test cluster");
    assert!(updated.active);
}

#[tokio::test]
async fn test_patch_null_clears_description() {
    let db = setup_test_db().await;
    let service = TagService::new(db);

    let created = service
        .create(serde_json::from_value(json!({"name": "patchy", "description": "to be cleared"})).unwrap())
        .await
        .unwrap();

    // Absent leaves the field alone
    let untouched = service
        .update(created.id, UpdateTagRequest::default())
        .await
        .unwrap();
    assert_eq!(untouched.description, "to be cleared");

    let cleared = service
        .update(
            created.id,
            UpdateTagRequest {
                description: Patch::Null,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.description, "");
}

#[tokio::test]
async fn test_environment_delete_cascades_to_templates() {
    let db = setup_test_db().await;
    let environments = EnvironmentService::new(db.clone());
    let tags = TagService::new(db.clone());
    let templates = TemplateService::new(db.clone());

    let env = environments
        .create(environment_request("Doomed", "doomed"))
        .await
        .unwrap();
    let tag = tags.create(tag_request("survivor")).await.unwrap();
    let template = templates
        .create(template_request("cascades", env.id, vec![tag.id]))
        .await
        .unwrap();

    environments.delete(env.id).await.unwrap();

    assert!(matches!(
        templates.get(template.id).await,
        Err(AppError::NotFound(_))
    ));
    let links = TemplateTags::find()
        .filter(template_tags::Column::TemplateId.eq(template.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(links, 0);

    // The tag itself is untouched
    assert!(tags.get(tag.id).await.is_ok());
}

#[tokio::test]
async fn test_tag_delete_detaches_but_keeps_templates() {
    let db = setup_test_db().await;
    let environments = EnvironmentService::new(db.clone());
    let tags = TagService::new(db.clone());
    let templates = TemplateService::new(db.clone());

    let env = environments
        .create(environment_request("Dev", "dev"))
        .await
        .unwrap();
    let keep = tags.create(tag_request("keep")).await.unwrap();
    let doomed = tags.create(tag_request("doomed")).await.unwrap();
    let template = templates
        .create(template_request("detaches", env.id, vec![keep.id, doomed.id]))
        .await
        .unwrap();
    assert_eq!(template.tags.len(), 2);

    tags.delete(doomed.id).await.unwrap();

    let after = templates.get(template.id).await.unwrap();
    assert_eq!(after.tags.len(), 1);
    assert_eq!(after.tags[0].name, "keep");
}

#[tokio::test]
async fn test_template_name_unique_per_environment() {
    let db = setup_test_db().await;
    let environments = EnvironmentService::new(db.clone());
    let templates = TemplateService::new(db);

    let env_a = environments
        .create(environment_request("A", "enva"))
        .await
        .unwrap();
    let env_b = environments
        .create(environment_request("B", "envb"))
        .await
        .unwrap();

    templates
        .create(template_request("shared-name", env_a.id, vec![]))
        .await
        .unwrap();
    templates
        .create(template_request("shared-name", env_b.id, vec![]))
        .await
        .unwrap();

    let duplicate = templates
        .create(template_request("shared-name", env_a.id, vec![]))
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_template_update_resets_documents_on_null() {
    let db = setup_test_db().await;
    let environments = EnvironmentService::new(db.clone());
    let templates = TemplateService::new(db);

    let env = environments
        .create(environment_request("Dev", "dev"))
        .await
        .unwrap();

    let created = templates
        .create(
            serde_json::from_value(json!({
                "name": "documents",
                "format": "yaml",
                "content": "a: 1",
                "schema": {"type": "object"},
                "default_values": {"a": 1},
                "version": "2.0.0",
                "environment_id": env.id,
                "created_by": "tester"
            }))
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(created.schema, json!({"type": "object"}));

    let updated = templates
        .update(
            created.id,
            serde_json::from_value::<UpdateTemplateRequest>(json!({
                "schema": null,
                "updated_by": "tester"
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(updated.schema, json!({}));
    // Absent field keeps its value
    assert_eq!(updated.default_values, json!({"a": 1}));
}

#[tokio::test]
async fn test_template_list_shares_environment_across_page() {
    let db = setup_test_db().await;
    let environments = EnvironmentService::new(db.clone());
    let templates = TemplateService::new(db);

    let env = environments
        .create(environment_request("Shared", "shared"))
        .await
        .unwrap();
    templates
        .create(template_request("first", env.id, vec![]))
        .await
        .unwrap();
    templates
        .create(template_request("second", env.id, vec![]))
        .await
        .unwrap();

    let listed = templates
        .list(&config_service::models::template::TemplateListQuery::default())
        .await
        .unwrap();

    assert_eq!(listed.total, 2);
    for template in &listed.templates {
        assert_eq!(template.environment.id, env.id);
        assert_eq!(template.environment.slug, "shared");
    }
}

#[tokio::test]
async fn test_list_filters_by_active_flag() {
    let db = setup_test_db().await;
    let service = EnvironmentService::new(db);

    service
        .create(environment_request("On", "on"))
        .await
        .unwrap();
    let off = service
        .create(environment_request("Off", "off"))
        .await
        .unwrap();
    service
        .update(
            off.id,
            UpdateEnvironmentRequest {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let active_only = service
        .list(&ListQuery {
            active: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active_only.total, 1);
    assert_eq!(active_only.environments[0].slug, "on");

    let inactive_only = service
        .list(&ListQuery {
            active: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(inactive_only.total, 1);
    assert_eq!(inactive_only.environments[0].slug, "off");
}

#[tokio::test]
async fn test_environments_ordered_by_priority() {
    let db = setup_test_db().await;
    let service = EnvironmentService::new(db.clone());
    seed::seed_initial_data(&db).await.unwrap();

    let listed = service.list(&ListQuery::default()).await.unwrap();
    let slugs: Vec<&str> = listed.environments.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, vec!["prod", "staging", "dev"]);
}

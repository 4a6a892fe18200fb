use crate::api::error::AppError;
use crate::entities::{prelude::*, tags, template_tags, templates};
use crate::models::environment::EnvironmentResponse;
use crate::models::tag::TagResponse;
use crate::models::template::{
    CreateTemplateRequest, TemplateListQuery, TemplateListResponse, TemplateResponse,
    UpdateTemplateRequest,
};
use crate::models::Patch;
use crate::utils::validation::{self, Violations};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use std::collections::HashMap;
use validator::Validate;

#[derive(Clone)]
pub struct TemplateService {
    db: DatabaseConnection,
}

impl TemplateService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, query: &TemplateListQuery) -> Result<TemplateListResponse, AppError> {
        let (page, page_size) = query.normalized();

        let mut find = Templates::find()
            .order_by_asc(templates::Column::Name)
            .order_by_asc(templates::Column::Id);
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            find = find.filter(templates::Column::Name.contains(search));
        }
        if let Some(active) = query.active {
            find = find.filter(templates::Column::Active.eq(active));
        }
        if let Some(environment_id) = query.environment_id {
            find = find.filter(templates::Column::EnvironmentId.eq(environment_id));
        }

        let paginator = find.paginate(&self.db, page_size);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page).await?;

        // Environments repeat across templates on a page, so resolve each once.
        let mut environments: HashMap<i64, EnvironmentResponse> = HashMap::new();
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let environment = match environments.get(&model.environment_id) {
                Some(env) => env.clone(),
                None => {
                    let env = self.environment_of(&model).await?;
                    environments.insert(model.environment_id, env.clone());
                    env
                }
            };
            let tags = self.tags_of(&model).await?;
            out.push(TemplateResponse::from_parts(model, environment, tags));
        }

        Ok(TemplateListResponse {
            templates: out,
            total,
            page: page + 1,
            page_size,
            has_next: (page + 1) * page_size < total,
        })
    }

    pub async fn get(&self, id: i64) -> Result<TemplateResponse, AppError> {
        let model = Templates::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("template {} not found", id)))?;
        self.compose(model).await
    }

    pub async fn create(&self, req: CreateTemplateRequest) -> Result<TemplateResponse, AppError> {
        let mut violations = Violations::new();
        if let Err(e) = req.validate() {
            violations.merge(&e);
        }
        violations.check("version", validation::semver_version(&req.version));
        violations.into_result().map_err(AppError::Validation)?;

        self.require_environment(req.environment_id).await?;
        let mut tag_ids = req.tag_ids.clone();
        tag_ids.sort_unstable();
        tag_ids.dedup();
        self.require_tags(&tag_ids).await?;

        let now = Utc::now();
        let created_by = req.created_by.clone();
        let txn = self.db.begin().await?;

        let model = templates::ActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            format: Set(req.format),
            content: Set(req.content),
            schema: Set(req.schema.unwrap_or_else(|| json!({}))),
            default_values: Set(req.default_values.unwrap_or_else(|| json!({}))),
            version: Set(req.version),
            environment_id: Set(req.environment_id),
            active: Set(req.active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            created_by: Set(created_by.clone()),
            updated_by: Set(created_by),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        Self::link_tags(&txn, model.id, &tag_ids).await?;
        txn.commit().await?;

        tracing::info!(
            "📄 Created template '{}' v{} ({} tags)",
            model.name,
            model.version,
            tag_ids.len()
        );
        self.compose(model).await
    }

    pub async fn update(
        &self,
        id: i64,
        req: UpdateTemplateRequest,
    ) -> Result<TemplateResponse, AppError> {
        let mut violations = Violations::new();
        violations.check("updated_by", validation::non_empty(&req.updated_by));
        if let Some(name) = &req.name {
            violations.check("name", validation::length_between(name, 1, 200));
        }
        if let Some(description) = req.description.as_value() {
            violations.check("description", validation::length_between(description, 0, 1000));
        }
        if let Some(content) = &req.content {
            violations.check("content", validation::non_empty(content));
        }
        if let Some(version) = &req.version {
            violations.check("version", validation::semver_version(version));
        }
        violations.into_result().map_err(AppError::Validation)?;

        let model = Templates::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("template {} not found", id)))?;

        if let Some(environment_id) = req.environment_id {
            self.require_environment(environment_id).await?;
        }
        let tag_ids = match &req.tag_ids {
            Some(ids) => {
                let mut ids = ids.clone();
                ids.sort_unstable();
                ids.dedup();
                self.require_tags(&ids).await?;
                Some(ids)
            }
            None => None,
        };

        let txn = self.db.begin().await?;

        let mut active = model.into_active_model();
        if let Some(name) = req.name {
            active.name = Set(name);
        }
        match req.description {
            Patch::Missing => {}
            Patch::Null => active.description = Set(String::new()),
            Patch::Value(v) => active.description = Set(v),
        }
        if let Some(format) = req.format {
            active.format = Set(format);
        }
        if let Some(content) = req.content {
            active.content = Set(content);
        }
        match req.schema {
            Patch::Missing => {}
            Patch::Null => active.schema = Set(json!({})),
            Patch::Value(v) => active.schema = Set(v),
        }
        match req.default_values {
            Patch::Missing => {}
            Patch::Null => active.default_values = Set(json!({})),
            Patch::Value(v) => active.default_values = Set(v),
        }
        if let Some(version) = req.version {
            active.version = Set(version);
        }
        if let Some(environment_id) = req.environment_id {
            active.environment_id = Set(environment_id);
        }
        if let Some(flag) = req.active {
            active.active = Set(flag);
        }
        active.updated_by = Set(req.updated_by);
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        if let Some(ids) = &tag_ids {
            TemplateTags::delete_many()
                .filter(template_tags::Column::TemplateId.eq(id))
                .exec(&txn)
                .await?;
            Self::link_tags(&txn, id, ids).await?;
        }

        txn.commit().await?;
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = Templates::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("template {} not found", id)));
        }
        tracing::info!("🗑️ Deleted template {}", id);
        Ok(())
    }

    async fn link_tags<C: ConnectionTrait>(
        conn: &C,
        template_id: i64,
        tag_ids: &[i64],
    ) -> Result<(), AppError> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let rows = tag_ids.iter().map(|tag_id| template_tags::ActiveModel {
            template_id: Set(template_id),
            tag_id: Set(*tag_id),
        });
        TemplateTags::insert_many(rows).exec(conn).await?;
        Ok(())
    }

    async fn require_environment(&self, id: i64) -> Result<(), AppError> {
        Environments::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("environment {} not found", id)))
    }

    async fn require_tags(&self, tag_ids: &[i64]) -> Result<(), AppError> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let found = Tags::find()
            .filter(tags::Column::Id.is_in(tag_ids.to_vec()))
            .all(&self.db)
            .await?;
        if found.len() != tag_ids.len() {
            let known: Vec<i64> = found.iter().map(|t| t.id).collect();
            let missing: Vec<String> = tag_ids
                .iter()
                .filter(|id| !known.contains(id))
                .map(|id| id.to_string())
                .collect();
            return Err(AppError::NotFound(format!(
                "tags not found: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    async fn environment_of(
        &self,
        model: &templates::Model,
    ) -> Result<EnvironmentResponse, AppError> {
        Environments::find_by_id(model.environment_id)
            .one(&self.db)
            .await?
            .map(EnvironmentResponse::from)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "environment {} missing for template {}",
                    model.environment_id, model.id
                ))
            })
    }

    async fn tags_of(&self, model: &templates::Model) -> Result<Vec<TagResponse>, AppError> {
        let mut tags: Vec<TagResponse> = model
            .find_related(Tags)
            .all(&self.db)
            .await?
            .into_iter()
            .map(TagResponse::from)
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn compose(&self, model: templates::Model) -> Result<TemplateResponse, AppError> {
        let environment = self.environment_of(&model).await?;
        let tags = self.tags_of(&model).await?;
        Ok(TemplateResponse::from_parts(model, environment, tags))
    }
}

use crate::api::error::AppError;
use crate::entities::{environments, prelude::*};
use crate::models::environment::{
    CreateEnvironmentRequest, EnvironmentListResponse, EnvironmentResponse,
    UpdateEnvironmentRequest, DEFAULT_PRIORITY,
};
use crate::models::{ListQuery, Patch};
use crate::utils::validation::{self, Violations};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use validator::Validate;

#[derive(Clone)]
pub struct EnvironmentService {
    db: DatabaseConnection,
}

impl EnvironmentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<EnvironmentListResponse, AppError> {
        let (page, page_size) = query.normalized();

        let mut find = Environments::find()
            .order_by_desc(environments::Column::Priority)
            .order_by_asc(environments::Column::Name);
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            find = find.filter(environments::Column::Name.contains(search));
        }
        if let Some(active) = query.active {
            find = find.filter(environments::Column::Active.eq(active));
        }

        let paginator = find.paginate(&self.db, page_size);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page).await?;

        Ok(EnvironmentListResponse {
            environments: models.into_iter().map(EnvironmentResponse::from).collect(),
            total,
            page: page + 1,
            page_size,
            has_next: (page + 1) * page_size < total,
        })
    }

    pub async fn get(&self, id: i64) -> Result<EnvironmentResponse, AppError> {
        let model = Environments::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("environment {} not found", id)))?;
        Ok(model.into())
    }

    pub async fn create(
        &self,
        req: CreateEnvironmentRequest,
    ) -> Result<EnvironmentResponse, AppError> {
        let priority = req.priority.unwrap_or(DEFAULT_PRIORITY);

        let mut violations = Violations::new();
        if let Err(e) = req.validate() {
            violations.merge(&e);
        }
        violations.check("slug", validation::alphanumeric_slug(&req.slug));
        violations.check("priority", validation::priority_range(priority));
        violations.into_result().map_err(AppError::Validation)?;

        let now = Utc::now();
        let model = environments::ActiveModel {
            name: Set(req.name),
            slug: Set(req.slug),
            description: Set(req.description),
            active: Set(req.active.unwrap_or(true)),
            priority: Set(priority),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(
            "🌍 Created environment '{}' (slug: {}, priority: {})",
            model.name,
            model.slug,
            model.priority
        );
        Ok(model.into())
    }

    pub async fn update(
        &self,
        id: i64,
        req: UpdateEnvironmentRequest,
    ) -> Result<EnvironmentResponse, AppError> {
        let mut violations = Violations::new();
        if let Some(name) = &req.name {
            violations.check("name", validation::length_between(name, 1, 100));
        }
        if let Some(slug) = &req.slug {
            violations.check("slug", validation::alphanumeric_slug(slug));
        }
        if let Some(description) = req.description.as_value() {
            violations.check("description", validation::length_between(description, 0, 500));
        }
        if let Some(priority) = req.priority {
            violations.check("priority", validation::priority_range(priority));
        }
        violations.into_result().map_err(AppError::Validation)?;

        let model = Environments::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("environment {} not found", id)))?;

        let mut active = model.into_active_model();
        if let Some(name) = req.name {
            active.name = Set(name);
        }
        if let Some(slug) = req.slug {
            active.slug = Set(slug);
        }
        match req.description {
            Patch::Missing => {}
            Patch::Null => active.description = Set(String::new()),
            Patch::Value(v) => active.description = Set(v),
        }
        if let Some(flag) = req.active {
            active.active = Set(flag);
        }
        if let Some(priority) = req.priority {
            active.priority = Set(priority);
        }
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = Environments::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("environment {} not found", id)));
        }
        tracing::info!("🗑️ Deleted environment {} (templates cascade)", id);
        Ok(())
    }
}

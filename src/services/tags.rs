use crate::api::error::AppError;
use crate::entities::{prelude::*, tags};
use crate::models::tag::{
    CreateTagRequest, TagListQuery, TagListResponse, TagResponse, UpdateTagRequest,
};
use crate::utils::validation::{self, Violations};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use validator::Validate;

#[derive(Clone)]
pub struct TagService {
    db: DatabaseConnection,
}

impl TagService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, query: &TagListQuery) -> Result<TagListResponse, AppError> {
        let (page, page_size) = query.normalized();

        let mut find = Tags::find().order_by_asc(tags::Column::Name);
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            find = find.filter(tags::Column::Name.contains(search));
        }

        let paginator = find.paginate(&self.db, page_size);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page).await?;

        Ok(TagListResponse {
            tags: models.into_iter().map(TagResponse::from).collect(),
            total,
            page: page + 1,
            page_size,
            has_next: (page + 1) * page_size < total,
        })
    }

    pub async fn get(&self, id: i64) -> Result<TagResponse, AppError> {
        let model = Tags::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tag {} not found", id)))?;
        Ok(model.into())
    }

    pub async fn create(&self, req: CreateTagRequest) -> Result<TagResponse, AppError> {
        let mut violations = Violations::new();
        if let Err(e) = req.validate() {
            violations.merge(&e);
        }
        violations.check("color", validation::hex_color(&req.color));
        violations.into_result().map_err(AppError::Validation)?;

        let now = Utc::now();
        let model = tags::ActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            color: Set(req.color),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!("🏷️ Created tag '{}' ({})", model.name, model.id);
        Ok(model.into())
    }

    pub async fn update(&self, id: i64, req: UpdateTagRequest) -> Result<TagResponse, AppError> {
        let mut violations = Violations::new();
        if let Some(name) = &req.name {
            violations.check("name", validation::length_between(name, 1, 100));
        }
        if let Some(description) = req.description.as_value() {
            violations.check("description", validation::length_between(description, 0, 500));
        }
        if let Some(color) = &req.color {
            violations.check("color", validation::hex_color(color));
        }
        violations.into_result().map_err(AppError::Validation)?;

        let model = Tags::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tag {} not found", id)))?;

        let mut active = model.into_active_model();
        if let Some(name) = req.name {
            active.name = Set(name);
        }
        match req.description {
            crate::models::Patch::Missing => {}
            crate::models::Patch::Null => active.description = Set(String::new()),
            crate::models::Patch::Value(v) => active.description = Set(v),
        }
        if let Some(color) = req.color {
            active.color = Set(color);
        }
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;

        // The row timestamp is finalized by a trigger, so read it back.
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = Tags::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("tag {} not found", id)));
        }
        tracing::info!("🗑️ Deleted tag {}", id);
        Ok(())
    }
}

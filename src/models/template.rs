use crate::entities::templates::{self, ConfigFormat};
use crate::models::environment::EnvironmentResponse;
use crate::models::tag::TagResponse;
use crate::models::Patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    #[serde(default)]
    pub description: String,
    pub format: ConfigFormat,
    /// Raw template content in the stated format
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
    /// Expected shape of rendered configuration; opaque to this service
    #[schema(value_type = Option<Object>)]
    pub schema: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub default_values: Option<Value>,
    /// Semantic version, e.g. `1.0.0`
    pub version: String,
    pub environment_id: i64,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    pub active: Option<bool>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub created_by: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    /// Null clears the description
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    pub format: Option<ConfigFormat>,
    pub content: Option<String>,
    /// Null resets to an empty document
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub schema: Patch<Value>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub default_values: Patch<Value>,
    pub version: Option<String>,
    pub environment_id: Option<i64>,
    /// When present, replaces the full tag set
    pub tag_ids: Option<Vec<i64>>,
    pub active: Option<bool>,
    pub updated_by: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub format: ConfigFormat,
    pub content: String,
    #[schema(value_type = Object)]
    pub schema: Value,
    #[schema(value_type = Object)]
    pub default_values: Value,
    pub version: String,
    pub environment: EnvironmentResponse,
    pub tags: Vec<TagResponse>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: String,
}

impl TemplateResponse {
    pub fn from_parts(
        model: templates::Model,
        environment: EnvironmentResponse,
        tags: Vec<TagResponse>,
    ) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            format: model.format,
            content: model.content,
            schema: model.schema,
            default_values: model.default_values,
            version: model.version,
            environment,
            tags,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            created_by: model.created_by,
            updated_by: model.updated_by,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateResponse>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_next: bool,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

/// Template list filters: common pagination plus an environment scope.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TemplateListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    pub search: Option<String>,
    pub active: Option<bool>,
    pub environment_id: Option<i64>,
}

impl Default for TemplateListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            search: None,
            active: None,
            environment_id: None,
        }
    }
}

impl TemplateListQuery {
    pub fn normalized(&self) -> (u64, u64) {
        let page = self.page.max(1);
        let page_size = self.page_size.clamp(1, 100);
        (page - 1, page_size)
    }
}

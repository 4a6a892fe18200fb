use crate::entities::environments;
use crate::models::Patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_PRIORITY: i32 = 50;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEnvironmentRequest {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: String,
    /// Alphanumeric identifier, e.g. `dev`
    pub slug: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    #[serde(default)]
    pub description: String,
    pub active: Option<bool>,
    /// 0-100; higher priority implies higher deployment precedence
    pub priority: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateEnvironmentRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    /// Null clears the description
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    pub active: Option<bool>,
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnvironmentResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub active: bool,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<environments::Model> for EnvironmentResponse {
    fn from(model: environments::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            active: model.active,
            priority: model.priority,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnvironmentListResponse {
    pub environments: Vec<EnvironmentResponse>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_next: bool,
}

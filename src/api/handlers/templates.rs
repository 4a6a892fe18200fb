use crate::AppState;
use crate::api::error::AppError;
use crate::models::template::{
    CreateTemplateRequest, TemplateListQuery, TemplateListResponse, TemplateResponse,
    UpdateTemplateRequest,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/api/v1/templates",
    params(TemplateListQuery),
    responses(
        (status = 200, description = "Paginated template listing", body = TemplateListResponse)
    ),
    tag = "templates"
)]
pub async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplateListQuery>,
) -> Result<Json<TemplateListResponse>, AppError> {
    Ok(Json(state.templates.list(&query).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/templates/{id}",
    params(("id" = i64, Path, description = "Template id")),
    responses(
        (status = 200, description = "Template detail with environment and tags", body = TemplateResponse),
        (status = 404, description = "Template not found")
    ),
    tag = "templates"
)]
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TemplateResponse>, AppError> {
    Ok(Json(state.templates.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/templates",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = TemplateResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Referenced environment or tag not found"),
        (status = 409, description = "Template name already exists in the environment")
    ),
    tag = "templates"
)]
pub async fn create_template(
    State(state): State<AppState>,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<TemplateResponse>), AppError> {
    let template = state.templates.create(req).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

#[utoipa::path(
    put,
    path = "/api/v1/templates/{id}",
    params(("id" = i64, Path, description = "Template id")),
    request_body = UpdateTemplateRequest,
    responses(
        (status = 200, description = "Template updated", body = TemplateResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Template, environment, or tag not found"),
        (status = 409, description = "Template name already exists in the environment")
    ),
    tag = "templates"
)]
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTemplateRequest>,
) -> Result<Json<TemplateResponse>, AppError> {
    Ok(Json(state.templates.update(id, req).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/templates/{id}",
    params(("id" = i64, Path, description = "Template id")),
    responses(
        (status = 204, description = "Template and its tag links deleted"),
        (status = 404, description = "Template not found")
    ),
    tag = "templates"
)]
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.templates.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

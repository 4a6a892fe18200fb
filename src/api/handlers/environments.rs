use crate::AppState;
use crate::api::error::AppError;
use crate::models::ListQuery;
use crate::models::environment::{
    CreateEnvironmentRequest, EnvironmentListResponse, EnvironmentResponse,
    UpdateEnvironmentRequest,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/api/v1/environments",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated environment listing", body = EnvironmentListResponse)
    ),
    tag = "environments"
)]
pub async fn list_environments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<EnvironmentListResponse>, AppError> {
    Ok(Json(state.environments.list(&query).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/environments/{id}",
    params(("id" = i64, Path, description = "Environment id")),
    responses(
        (status = 200, description = "Environment detail", body = EnvironmentResponse),
        (status = 404, description = "Environment not found")
    ),
    tag = "environments"
)]
pub async fn get_environment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EnvironmentResponse>, AppError> {
    Ok(Json(state.environments.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/environments",
    request_body = CreateEnvironmentRequest,
    responses(
        (status = 201, description = "Environment created", body = EnvironmentResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Name or slug already exists")
    ),
    tag = "environments"
)]
pub async fn create_environment(
    State(state): State<AppState>,
    Json(req): Json<CreateEnvironmentRequest>,
) -> Result<(StatusCode, Json<EnvironmentResponse>), AppError> {
    let environment = state.environments.create(req).await?;
    Ok((StatusCode::CREATED, Json(environment)))
}

#[utoipa::path(
    put,
    path = "/api/v1/environments/{id}",
    params(("id" = i64, Path, description = "Environment id")),
    request_body = UpdateEnvironmentRequest,
    responses(
        (status = 200, description = "Environment updated", body = EnvironmentResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Environment not found"),
        (status = 409, description = "Name or slug already exists")
    ),
    tag = "environments"
)]
pub async fn update_environment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateEnvironmentRequest>,
) -> Result<Json<EnvironmentResponse>, AppError> {
    Ok(Json(state.environments.update(id, req).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/environments/{id}",
    params(("id" = i64, Path, description = "Environment id")),
    responses(
        (status = 204, description = "Environment and its templates deleted"),
        (status = 404, description = "Environment not found")
    ),
    tag = "environments"
)]
pub async fn delete_environment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.environments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

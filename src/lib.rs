pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::environments::EnvironmentService;
use crate::services::health::HealthService;
use crate::services::tags::TagService;
use crate::services::templates::TemplateService;
use axum::{
    Router,
    middleware::from_fn,
    routing::get,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health,
        api::handlers::health::ready,
        api::handlers::health::live,
        api::handlers::meta::ping,
        api::handlers::tags::list_tags,
        api::handlers::tags::get_tag,
        api::handlers::tags::create_tag,
        api::handlers::tags::update_tag,
        api::handlers::tags::delete_tag,
        api::handlers::environments::list_environments,
        api::handlers::environments::get_environment,
        api::handlers::environments::create_environment,
        api::handlers::environments::update_environment,
        api::handlers::environments::delete_environment,
        api::handlers::templates::list_templates,
        api::handlers::templates::get_template,
        api::handlers::templates::create_template,
        api::handlers::templates::update_template,
        api::handlers::templates::delete_template,
    ),
    components(
        schemas(
            models::common::SuccessResponse,
            models::tag::CreateTagRequest,
            models::tag::UpdateTagRequest,
            models::tag::TagResponse,
            models::tag::TagListResponse,
            models::environment::CreateEnvironmentRequest,
            models::environment::UpdateEnvironmentRequest,
            models::environment::EnvironmentResponse,
            models::environment::EnvironmentListResponse,
            models::template::CreateTemplateRequest,
            models::template::UpdateTemplateRequest,
            models::template::TemplateResponse,
            models::template::TemplateListResponse,
            entities::templates::ConfigFormat,
            services::health::HealthResponse,
            services::health::ServiceHealthInfo,
            services::health::ProbeResponse,
        )
    ),
    tags(
        (name = "system", description = "Health probes and service metadata"),
        (name = "tags", description = "Tag management"),
        (name = "environments", description = "Deployment environment management"),
        (name = "templates", description = "Configuration template management")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub tags: TagService,
    pub environments: EnvironmentService,
    pub templates: TemplateService,
    pub health: HealthService,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: Arc<AppConfig>,
        cache: Option<redis::aio::ConnectionManager>,
    ) -> Self {
        Self {
            tags: TagService::new(db.clone()),
            environments: EnvironmentService::new(db.clone()),
            templates: TemplateService::new(db.clone()),
            health: HealthService::new(db.clone(), cache),
            db,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let mut router = Router::new();

    // Interactive API docs stay off production deployments
    if !state.config.server.is_production() {
        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    if state.config.metrics.enabled {
        router = router.route(
            &state.config.metrics.path,
            get(api::handlers::meta::scrape_metrics),
        );
    }

    router
        .route("/health", get(api::handlers::health::health))
        .route("/ready", get(api::handlers::health::ready))
        .route("/live", get(api::handlers::health::live))
        .route("/api/v1/ping", get(api::handlers::meta::ping))
        .route(
            "/api/v1/tags",
            get(api::handlers::tags::list_tags).post(api::handlers::tags::create_tag),
        )
        .route(
            "/api/v1/tags/:id",
            get(api::handlers::tags::get_tag)
                .put(api::handlers::tags::update_tag)
                .delete(api::handlers::tags::delete_tag),
        )
        .route(
            "/api/v1/environments",
            get(api::handlers::environments::list_environments)
                .post(api::handlers::environments::create_environment),
        )
        .route(
            "/api/v1/environments/:id",
            get(api::handlers::environments::get_environment)
                .put(api::handlers::environments::update_environment)
                .delete(api::handlers::environments::delete_environment),
        )
        .route(
            "/api/v1/templates",
            get(api::handlers::templates::list_templates)
                .post(api::handlers::templates::create_template),
        )
        .route(
            "/api/v1/templates/:id",
            get(api::handlers::templates::get_template)
                .put(api::handlers::templates::update_template)
                .delete(api::handlers::templates::delete_template),
        )
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(state)
}

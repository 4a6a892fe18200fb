use clap::Parser;
use config_service::config::AppConfig;
use config_service::infrastructure::{cache, database, migrations::MigrationRunner, seed};
use config_service::{AppState, create_app};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// What to run: serve, migrate, rollback, force, status
    #[arg(short, long, default_value = "serve")]
    mode: String,

    /// Number of migrations to roll back in rollback mode
    #[arg(long, default_value_t = 1)]
    steps: u32,

    /// Version to record in force mode
    #[arg(long)]
    force_version: Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let config = Arc::new(AppConfig::from_env());
    init_tracing(&config);

    info!("🚀 Starting config service [Mode: {}]...", args.mode);

    let db = database::setup_database(&config.database).await?;
    let runner = MigrationRunner::new(db.clone());

    match args.mode.as_str() {
        "migrate" => {
            runner.up().await?;
            return Ok(());
        }
        "rollback" => {
            let status = runner.down(args.steps).await?;
            info!("⏪ Rolled back to version {}", status.version.unwrap_or(0));
            return Ok(());
        }
        "force" => {
            let version = args
                .force_version
                .ok_or_else(|| anyhow::anyhow!("force mode requires --force-version"))?;
            runner.force_version(version).await?;
            return Ok(());
        }
        "status" => {
            let status = runner.status().await?;
            info!(
                "📋 Migration version: {} (dirty: {})",
                status.version.unwrap_or(0),
                status.dirty
            );
            return Ok(());
        }
        "serve" => {}
        other => anyhow::bail!("unknown mode '{}'", other),
    }

    let status = runner.status().await?;
    if status.dirty {
        anyhow::bail!(
            "refusing to start: migration state is dirty at version {}",
            status.version.unwrap_or(0)
        );
    }
    runner.up().await?;
    seed::seed_initial_data(&db).await?;

    let redis = cache::setup_cache(&config.redis).await?;
    let state = AppState::new(db, config.clone(), Some(redis));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    let app = create_app(state).layer(trace_layer);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ Server listening on: http://{}", addr);
    if !config.server.is_production() {
        info!(
            "📖 Swagger UI documentation: http://localhost:{}/swagger-ui",
            config.server.port
        );
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Config service exited cleanly.");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("config_service={},tower_http=info", config.logger.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logger.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, initiating graceful shutdown...");
        },
    }
}

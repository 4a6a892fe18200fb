use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use utoipa::ToSchema;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const READINESS_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServiceHealthInfo {
    /// `healthy` or `unhealthy`
    pub status: String,
    pub message: String,
    /// Round-trip latency, e.g. `3ms`
    pub latency: String,
    pub last_check: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` when every dependency responds, otherwise `unhealthy`
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub services: BTreeMap<String, ServiceHealthInfo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProbeResponse {
    pub status: String,
}

#[derive(Clone)]
pub struct HealthService {
    db: DatabaseConnection,
    cache: Option<ConnectionManager>,
}

impl HealthService {
    pub fn new(db: DatabaseConnection, cache: Option<ConnectionManager>) -> Self {
        Self { db, cache }
    }

    /// Full dependency report with per-service latency. Healthy only when
    /// every dependency answers within the check timeout.
    pub async fn health(&self) -> HealthResponse {
        let mut services = BTreeMap::new();
        services.insert(
            "database".to_string(),
            self.check_database(HEALTH_CHECK_TIMEOUT).await,
        );
        services.insert(
            "cache".to_string(),
            self.check_cache(HEALTH_CHECK_TIMEOUT).await,
        );

        let healthy = services.values().all(|s| s.status == "healthy");
        HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            services,
        }
    }

    /// Binary readiness: both dependencies must answer within a tighter
    /// timeout than the full health report uses.
    pub async fn ready(&self) -> bool {
        let db = self.check_database(READINESS_TIMEOUT).await;
        let cache = self.check_cache(READINESS_TIMEOUT).await;
        db.status == "healthy" && cache.status == "healthy"
    }

    async fn check_database(&self, limit: Duration) -> ServiceHealthInfo {
        let start = Instant::now();
        let outcome = timeout(limit, self.db.ping()).await;
        let latency = start.elapsed();

        match outcome {
            Ok(Ok(())) => healthy_info("database connection is active", latency),
            Ok(Err(e)) => unhealthy_info(format!("database ping failed: {}", e), latency),
            Err(_) => unhealthy_info("database ping timed out".to_string(), latency),
        }
    }

    async fn check_cache(&self, limit: Duration) -> ServiceHealthInfo {
        let start = Instant::now();
        let Some(cache) = self.cache.clone() else {
            return unhealthy_info("cache connection not configured".to_string(), start.elapsed());
        };

        let mut conn = cache;
        let outcome = timeout(
            limit,
            redis::cmd("PING").query_async::<String>(&mut conn),
        )
        .await;
        let latency = start.elapsed();

        match outcome {
            Ok(Ok(_)) => healthy_info("cache connection is active", latency),
            Ok(Err(e)) => unhealthy_info(format!("cache ping failed: {}", e), latency),
            Err(_) => unhealthy_info("cache ping timed out".to_string(), latency),
        }
    }
}

fn healthy_info(message: &str, latency: Duration) -> ServiceHealthInfo {
    ServiceHealthInfo {
        status: "healthy".to_string(),
        message: message.to_string(),
        latency: format!("{}ms", latency.as_millis()),
        last_check: Utc::now(),
    }
}

fn unhealthy_info(message: String, latency: Duration) -> ServiceHealthInfo {
    ServiceHealthInfo {
        status: "unhealthy".to_string(),
        message,
        latency: format!("{}ms", latency.as_millis()),
        last_check: Utc::now(),
    }
}

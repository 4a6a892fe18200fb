use crate::config::RedisConfig;
use redis::aio::ConnectionManager;
use tracing::info;

/// Connects to Redis and verifies the connection with a ping. The manager
/// reconnects on its own after transient failures.
pub async fn setup_cache(config: &RedisConfig) -> anyhow::Result<ConnectionManager> {
    info!("🔌 Cache: {}:{}/{}", config.host, config.port, config.db);

    let client = redis::Client::open(config.connection_url())?;
    let mut manager = ConnectionManager::new(client).await?;

    redis::cmd("PING").query_async::<String>(&mut manager).await?;

    info!("✅ Cache connected successfully");
    Ok(manager)
}

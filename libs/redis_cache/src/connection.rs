use deadpool_redis::Runtime;
use deadpool_redis::redis::AsyncCommands;
use std::{sync::Arc, time::Duration};
use tracing::{info, instrument, warn};

pub type Pool = Arc<deadpool_redis::Pool>;
pub type PooledConnection = deadpool_redis::Connection;

pub const MAX_POOL_SIZE: usize = 50;
/// Bounds waiting for, creating and recycling a connection.
pub const POOL_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn establish_connection(
    redis_url: String,
) -> Result<Pool, anyhow::Error> {
    let mut cfg = deadpool_redis::Config::from_url(redis_url);
    cfg.pool = Some(deadpool_redis::PoolConfig {
        max_size: MAX_POOL_SIZE,
        timeouts: deadpool_redis::Timeouts {
            wait: Some(POOL_TIMEOUT),
            create: Some(POOL_TIMEOUT),
            recycle: Some(POOL_TIMEOUT),
        },
        ..Default::default()
    });
    let pool = cfg.create_pool(Some(Runtime::Tokio1))?;

    let mut conn = pool.get().await?;
    let _: () = conn.ping().await?;

    Ok(Arc::new(pool))
}

/// Waits for checked-out connections to come back (bounded by `timeout`)
/// and then closes the pool.
#[instrument(skip(pool))]
pub async fn shutdown_pool_with_timeout(pool: Pool, timeout: Duration) {
    info!("Starting graceful Redis connection pool shutdown");

    let start = tokio::time::Instant::now();
    loop {
        let status = pool.status();
        let in_use = status.size.saturating_sub(status.available);
        if in_use == 0 {
            break;
        }
        if start.elapsed() > timeout {
            warn!(in_use, "Redis shutdown timeout reached with connections in use");
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    pool.close();

    info!("Redis connection pool closed");
}

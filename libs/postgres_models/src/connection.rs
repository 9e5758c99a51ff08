use diesel::pg::Pg;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tokio_postgres::Client as TokioPgClient;
use tracing::Instrument;
use tracing::{info, instrument, warn};

pub type Pool = bb8::Pool<AsyncPgConnection>;
pub type PooledConnection = bb8::PooledConnection<'static, AsyncPgConnection>;

pub const MAX_POOL_SIZE: u32 = 50;
pub const MIN_RESERVED_CONNECTIONS: u32 = 10;
pub const DEFAULT_PORT: u16 = 5432;

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Parses the `{"username": .., "password": ..}` secret format.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Credentials are percent-encoded, so secrets may contain `@`, `/`,
    /// `:` or `#`.
    pub fn database_url(
        &self,
        endpoint: &str,
        database: &str,
    ) -> Result<String, anyhow::Error> {
        let mut url = url::Url::parse(&format!(
            "postgresql://{endpoint}:{DEFAULT_PORT}/{database}"
        ))
        .map_err(|e| anyhow::anyhow!("Invalid database endpoint '{endpoint}': {e}"))?;

        url.set_username(&self.username)
            .map_err(|_| anyhow::anyhow!("Database URL cannot carry a username"))?;
        url.set_password(Some(&self.password))
            .map_err(|_| anyhow::anyhow!("Database URL cannot carry a password"))?;

        Ok(url.into())
    }
}

async fn create_tokio_pg_client(
    db_url: &str,
) -> Result<TokioPgClient, tokio_postgres::Error> {
    let (client, connection) =
        tokio_postgres::connect(db_url, tokio_postgres::NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    Ok(client)
}

async fn get_max_connections(
    client: &TokioPgClient,
) -> Result<i32, anyhow::Error> {
    let row = client
        .query_one("SELECT current_setting('max_connections')", &[])
        .await?;

    let max_conn_str: String = row.get(0);
    max_conn_str.parse().map_err(|e| {
        anyhow::anyhow!(
            "Failed to parse max_connections '{}': {}",
            max_conn_str,
            e
        )
    })
}

fn calculate_optimal_pool_size(
    db_max_connections: i32,
    num_pools: u32,
    reserved_for_admin: u32,
) -> u32 {
    let available =
        db_max_connections.saturating_sub(reserved_for_admin as i32).max(1);

    let per_pool = (available as f32 / num_pools.max(1) as f32).floor() as u32;

    per_pool.clamp(1, MAX_POOL_SIZE)
}

/// Builds a bb8 pool sized against the server's `max_connections`, shared
/// between `num_pools` pools of this process.
pub async fn establish_connection(
    db_url: String,
    num_pools: u32,
) -> Result<Pool, anyhow::Error> {
    let client = create_tokio_pg_client(&db_url).await.map_err(|e| {
        anyhow::anyhow!("Failed to create PostgreSQL tokio client: {}", e)
    })?;

    let max_conn = get_max_connections(&client).await?;
    let max_pool_size = calculate_optimal_pool_size(
        max_conn,
        num_pools,
        MIN_RESERVED_CONNECTIONS,
    );
    info!(
        max_connections = max_conn,
        max_pool_size, "Sizing PostgreSQL pool"
    );

    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    let pool = bb8::Pool::builder()
        .max_size(max_pool_size)
        .connection_timeout(Duration::from_secs(10))
        .idle_timeout(Some(Duration::from_secs(180)))
        .retry_connection(true)
        .max_lifetime(Some(Duration::from_secs(3600)))
        .build(config)
        .await?;

    let mut conn = pool.get_owned().await?;
    diesel::sql_query("SELECT 1").execute(&mut conn).await?;

    Ok(pool)
}

#[instrument(skip(pool))]
pub async fn shutdown_pool_with_timeout(
    pool: Arc<Pool>,
    shutdown_timeout: Duration,
) -> Result<(), String> {
    let state = pool.state();
    info!(
        total = state.connections,
        idle = state.idle_connections,
        "Starting graceful PostgreSQL pool shutdown"
    );

    let start = tokio::time::Instant::now();
    loop {
        let current_state = pool.state();
        let active = current_state.connections - current_state.idle_connections;

        if active == 0 {
            break;
        }

        if start.elapsed() > shutdown_timeout {
            warn!(
                active,
                "Shutdown timeout reached with active connections remaining"
            );
            break;
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    drop(pool);

    info!("PostgreSQL pool shutdown complete");
    Ok(())
}

pub async fn run_migrations<A>(
    async_connection: A,
    migrations: EmbeddedMigrations,
) -> Result<(), anyhow::Error>
where
    A: AsyncConnection<Backend = Pg> + 'static,
{
    let mut async_wrapper: AsyncConnectionWrapper<A> =
        AsyncConnectionWrapper::from(async_connection);

    let applied = task::spawn_blocking(move || {
        async_wrapper
            .run_pending_migrations(migrations)
            .map(|versions| versions.len())
            .map_err(|e| anyhow::anyhow!("failed to run migrations: {e}"))
    })
    .await??;

    info!(applied, "Database migrations complete");
    Ok(())
}

/// Runs `operation` with a connection checked out only for its duration.
///
/// Pool acquisition is traced as `acquiring_pooled_connection` and usage as
/// `holding_db_connection`.
pub async fn with_connection<F, Fut, T, E>(
    pool: &Pool,
    operation: F,
) -> Result<T, WithConnectionError<E>>
where
    F: FnOnce(PooledConnection) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let pool_state_before = pool.state();
    let acquire_span = tracing::info_span!(
        "acquiring_pooled_connection",
        pool.connections = pool_state_before.connections,
        pool.idle_connections = pool_state_before.idle_connections,
    );

    let conn =
        async { pool.get_owned().await.map_err(WithConnectionError::Pool) }
            .instrument(acquire_span)
            .await?;

    let hold_span = tracing::info_span!("holding_db_connection");
    let result = async {
        operation(conn)
            .await
            .map_err(WithConnectionError::Operation)
    }
    .instrument(hold_span)
    .await;

    let pool_state_after = pool.state();
    tracing::debug!(
        pool.connections = pool_state_after.connections,
        pool.idle_connections = pool_state_after.idle_connections,
        "connection_returned_to_pool"
    );

    result
}

/// Error type for with_connection that distinguishes between pool and operation errors
#[derive(Debug)]
pub enum WithConnectionError<E> {
    /// Error acquiring connection from the pool
    Pool(diesel_async::pooled_connection::bb8::RunError),
    /// Error from the database operation itself
    Operation(E),
}

impl<E: std::fmt::Display> std::fmt::Display for WithConnectionError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithConnectionError::Pool(e) => {
                write!(f, "Failed to acquire connection: {}", e)
            }
            WithConnectionError::Operation(e) => {
                write!(f, "Database operation failed: {}", e)
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error
    for WithConnectionError<E>
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WithConnectionError::Pool(e) => Some(e),
            WithConnectionError::Operation(e) => Some(e),
        }
    }
}

/// Runs `operation` inside a transaction that commits on `Ok` and rolls back
/// on `Err`.
pub async fn with_transaction<F, T, E>(
    pool: &Pool,
    operation: F,
) -> Result<T, WithConnectionError<E>>
where
    F: for<'c> FnOnce(
            &'c mut AsyncPgConnection,
        ) -> futures::future::BoxFuture<'c, Result<T, E>>
        + Send,
    T: Send,
    E: From<diesel::result::Error> + std::error::Error + Send,
{
    with_connection(pool, |mut conn| async move {
        let txn_span = tracing::info_span!("database_transaction");

        async {
            let result = conn
                .transaction::<T, E, _>(|txn_conn| {
                    Box::pin(operation(txn_conn))
                })
                .await;

            match &result {
                Ok(_) => tracing::debug!("transaction_committed"),
                Err(e) => {
                    tracing::warn!(error = %e, "transaction_rolled_back")
                }
            }

            result
        }
        .instrument(txn_span)
        .await
    })
    .await
}

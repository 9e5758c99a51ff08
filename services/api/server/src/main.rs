use anyhow::Context;
use std::sync::Arc;
use telemetry::metrics::Telemetry;
use weather_api::metrics::ServerMetrics;
use weather_api::shutdown::{ShutdownCoordinator, listen_for_shutdown_signals};
use weather_api::store::{MemoryStore, PostgresStore, QueryStore};
use weather_api::{Config, StorageBackend};
use weather_client::{OpenWeatherProvider, WeatherProvider};

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!("./../../../db/migrations");

fn main() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    // Kept alive for the whole process so events are flushed on exit.
    let _sentry = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to build tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    runtime.block_on(async {
        if let Err(e) = setup(config).await {
            tracing::error!("Fatal error during setup: {e:#}");
            std::process::exit(1);
        }
    });
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.rust_log))
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize tracing filter")?;

    if config.log_format != "pretty" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_timer(UtcTime::rfc_3339())
            .with_target(true)
            .with_level(true)
            .json();
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .pretty();
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    };

    Ok(())
}

/// Opens the configured store plus the pools the shutdown sequence drains.
async fn open_store(
    config: &Config,
) -> anyhow::Result<(Arc<dyn QueryStore>, Vec<postgres_models::connection::Pool>)>
{
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, history is lost on restart");
            Ok((Arc::new(MemoryStore::new()), Vec::new()))
        }
        StorageBackend::Postgres => {
            let (db_rw_url, db_ro_url) = config.database_urls()?;

            let db_pool =
                postgres_models::connection::establish_connection(db_rw_url, 2)
                    .await
                    .context("Failed to connect to Postgres (read-write)")?;

            let db_pool_conn = db_pool
                .get_owned()
                .await
                .context("Failed to get connection from pool for migrations")?;

            postgres_models::connection::run_migrations(db_pool_conn, MIGRATIONS)
                .await
                .context("Failed to run database migrations")?;

            let read_only_pool =
                postgres_models::connection::establish_connection(db_ro_url, 2)
                    .await
                    .context("Failed to connect to Postgres (read-only)")?;

            let store = PostgresStore::new(db_pool.clone(), read_only_pool.clone());
            Ok((Arc::new(store), vec![db_pool, read_only_pool]))
        }
    }
}

async fn setup(config: Config) -> anyhow::Result<()> {
    init_tracing(&config)?;

    let addr = format!("0.0.0.0:{}", config.api_service_port);
    tracing::info!("Starting weather-api service at: {addr}");

    let (store, db_pools) = open_store(&config).await?;

    let redis_pool = match config.redis_url.clone() {
        Some(url) => Some(
            redis_cache::connection::establish_connection(url)
                .await
                .context("Failed to connect to Redis")?,
        ),
        None => {
            tracing::info!("REDIS_URL not set, live lookups are not cached");
            None
        }
    };

    let provider: Arc<dyn WeatherProvider> = Arc::new(
        OpenWeatherProvider::new(config.provider_config())
            .context("Failed to create weather provider")?,
    );

    let shutdown = Arc::new(ShutdownCoordinator::new(db_pools, redis_pool.clone()));

    let metrics =
        ServerMetrics::new(None).context("Failed to create server metrics")?;
    let telemetry = Telemetry::new(Some(metrics));
    telemetry.start().context("Failed to start telemetry")?;
    tracing::info!("Initialized telemetry");

    let app = weather_api::app(weather_api::AppState {
        telemetry,
        store,
        provider,
        cache: redis_pool.map(|pool| {
            Arc::new(redis_cache::RedisCache::new(pool)) as Arc<dyn redis_cache::Cache>
        }),
        config: Arc::new(config),
        shutdown: shutdown.clone(),
    });

    let shutdown_handle = shutdown.clone();
    tokio::spawn(async move {
        listen_for_shutdown_signals().await;
        shutdown_handle.shutdown().await;
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    let shutdown_for_serve = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_for_serve.wait_for_shutdown().await
        })
        .await
        .context("Server exited with error")?;

    Ok(())
}

//! # Weather History API
//!
//! Live weather lookups, a persisted search history and bulk exports of that
//! history, served under `/api`.
use crate::metrics::ServerMetrics;
use crate::shared::extractors::request_id::RequestId;
use crate::shutdown::ShutdownCoordinator;
use crate::store::QueryStore;
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics::Telemetry;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use weather_client::{ProviderConfig, WeatherProvider};

pub mod health;
pub mod metrics;
pub mod openapi;
pub mod shared;
pub mod shutdown;
pub mod store;
mod weather_api;

pub use weather_api::api_error::{ApiV1Detail, ApiV1Error};

pub const VERSION: Option<&'static str> = option_env!("VERSION");

/// Swagger UI plus the OpenAPI document, outside `/api`.
pub fn get_openapi_routes() -> Router {
    use axum::Json;
    use utoipa_swagger_ui::SwaggerUi;

    // OpenAPI 3.0 flavoured document for tools that choke on 3.1 nullables.
    async fn openapi_3_0_handler() -> Json<serde_json::Value> {
        Json(openapi::WeatherApiDoc::openapi_json())
    }

    Router::new()
        .route("/api-docs/openapi.json", get(openapi_3_0_handler))
        .merge(SwaggerUi::new("/swagger-ui").url(
            "/api-docs/openapi-3.1.json",
            openapi::WeatherApiDoc::openapi(),
        ))
}

#[derive(Clone)]
pub struct AppState {
    pub telemetry: Arc<Telemetry<ServerMetrics>>,
    pub store: Arc<dyn QueryStore>,
    pub provider: Arc<dyn WeatherProvider>,
    pub cache: Option<Arc<dyn redis_cache::Cache>>,
    pub config: Arc<Config>,
    pub shutdown: Arc<ShutdownCoordinator>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    // Service port
    #[serde(default = "default_port")]
    pub api_service_port: u16,

    // Loggers
    #[serde(default = "default_rust_log")]
    pub rust_log: String,
    #[serde(default)]
    pub log_format: String,

    // Storage
    #[serde(default)]
    pub storage_backend: StorageBackend,
    pub database_credentials: Option<String>,
    pub database_rw_endpoint: Option<String>,
    pub database_ro_endpoint: Option<String>,
    #[serde(default = "default_database_name")]
    pub database_name: String,

    // Redis configs
    pub redis_url: Option<String>,
    #[serde(default = "default_cache_ttl")]
    pub live_cache_ttl_seconds: u64,

    // Upstream providers
    pub openweather_api_key: String,
    #[serde(default = "default_openweather_base_url")]
    pub openweather_base_url: String,
    #[serde(default = "default_nominatim_base_url")]
    pub nominatim_base_url: String,
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_seconds: u64,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    pub sentry_dsn: Option<String>,
}

fn default_port() -> u16 {
    8001
}

fn default_rust_log() -> String {
    "info".to_string()
}

fn default_database_name() -> String {
    "weather".to_string()
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_openweather_base_url() -> String {
    weather_client::provider::DEFAULT_OPENWEATHER_BASE_URL.to_string()
}

fn default_nominatim_base_url() -> String {
    weather_client::provider::DEFAULT_NOMINATIM_BASE_URL.to_string()
}

fn default_upstream_timeout() -> u64 {
    10
}

fn default_cors_origins() -> String {
    "*".to_string()
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        // Load .env file if present (useful when running outside docker-compose)
        match dotenv::dotenv() {
            Ok(path) => eprintln!("Loaded .env from: {}", path.display()),
            Err(e) => eprintln!("dotenv warning: {e}"),
        }

        envy::from_env::<Config>()
    }

    /// Same as [`Config::load`] but from explicit key/value pairs.
    pub fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }

    pub fn database_credentials(
        &self,
    ) -> anyhow::Result<postgres_models::connection::Credentials> {
        let raw = self
            .database_credentials
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_CREDENTIALS is not set"))?;

        postgres_models::connection::Credentials::from_json(raw)
            .map_err(|e| anyhow::anyhow!("DATABASE_CREDENTIALS is invalid: {e}"))
    }

    /// Read-write and read-only database URLs; the read-only endpoint falls
    /// back to the read-write one.
    pub fn database_urls(&self) -> anyhow::Result<(String, String)> {
        let creds = self.database_credentials()?;
        let rw_endpoint = self
            .database_rw_endpoint
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_RW_ENDPOINT is not set"))?;
        let ro_endpoint =
            self.database_ro_endpoint.as_deref().unwrap_or(rw_endpoint);

        Ok((
            creds.database_url(rw_endpoint, &self.database_name)?,
            creds.database_url(ro_endpoint, &self.database_name)?,
        ))
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            api_key: self.openweather_api_key.clone(),
            openweather_base_url: self.openweather_base_url.clone(),
            nominatim_base_url: self.nominatim_base_url.clone(),
            timeout: Duration::from_secs(self.upstream_timeout_seconds),
        }
    }

    pub fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty() && *origin != "*")
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(origin, "Ignoring invalid CORS origin: {e}");
                    None
                }
            })
            .collect();

        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        if origins.is_empty() || self.cors_origins.split(',').any(|o| o.trim() == "*") {
            layer.allow_origin(Any)
        } else {
            layer.allow_origin(AllowOrigin::list(origins))
        }
    }
}

async fn fallback_handler(RequestId(request_id): RequestId) -> ApiV1Error {
    ApiV1Error::not_found(
        "The requested endpoint does not exist".to_string(),
        vec![],
        request_id.to_string(),
    )
}

/// The complete HTTP application: `/api` routes, health, version, metrics
/// and OpenAPI documentation.
pub fn app(state: AppState) -> Router {
    let telemetry = state.telemetry.clone();
    let cors = state.config.cors_layer();

    Router::new()
        .route("/health", get(health::handler))
        .route("/api", get(weather_api::core::banner))
        .route("/api/", get(weather_api::core::banner))
        .route("/api/health", get(health::handler))
        .with_state(state.clone())
        .nest("/api", weather_api::core::get_routes(state))
        .route(
            "/version",
            get(|| async { VERSION.unwrap_or("unknown") }),
        )
        .route(
            "/metrics",
            get(move || {
                let telemetry = telemetry.clone();
                async move {
                    (
                        axum::http::StatusCode::OK,
                        [(
                            axum::http::header::CONTENT_TYPE,
                            "text/plain; charset=utf-8",
                        )],
                        telemetry.get_metrics(),
                    )
                }
            }),
        )
        .merge(get_openapi_routes())
        .fallback(fallback_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CatchPanicLayer::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn config_defaults() {
        let config =
            Config::from_iter(vars(&[("OPENWEATHER_API_KEY", "key")])).unwrap();

        assert_eq!(config.api_service_port, 8001);
        assert_eq!(config.storage_backend, StorageBackend::Postgres);
        assert_eq!(config.database_name, "weather");
        assert_eq!(config.live_cache_ttl_seconds, 300);
        assert_eq!(config.cors_origins, "*");
        assert!(config.redis_url.is_none());

        let provider = config.provider_config();
        assert_eq!(provider.api_key, "key");
        assert_eq!(provider.timeout, Duration::from_secs(10));
        assert_eq!(
            provider.nominatim_base_url,
            "https://nominatim.openstreetmap.org"
        );
    }

    #[test]
    fn api_key_is_required() {
        assert!(Config::from_iter(vars(&[])).is_err());
    }

    #[test]
    fn read_only_endpoint_defaults_to_read_write() {
        let config = Config::from_iter(vars(&[
            ("OPENWEATHER_API_KEY", "key"),
            ("STORAGE_BACKEND", "memory"),
            (
                "DATABASE_CREDENTIALS",
                r#"{"username":"app","password":"pw"}"#,
            ),
            ("DATABASE_RW_ENDPOINT", "db-rw"),
        ]))
        .unwrap();

        assert_eq!(config.storage_backend, StorageBackend::Memory);
        let (rw, ro) = config.database_urls().unwrap();
        assert_eq!(rw, "postgresql://app:pw@db-rw:5432/weather");
        assert_eq!(ro, rw);
    }

    #[test]
    fn missing_credentials_is_an_error() {
        let config =
            Config::from_iter(vars(&[("OPENWEATHER_API_KEY", "key")])).unwrap();
        assert!(config.database_urls().is_err());
    }
}

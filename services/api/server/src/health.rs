use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

const STORE_TIMEOUT: Duration = Duration::from_secs(5);
const REDIS_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Serialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub components: BTreeMap<String, ComponentHealth>,
}

/// The store is critical; the cache only degrades the service.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Healthy or degraded", body = HealthResponse),
        (status = 503, description = "Unhealthy or shutting down", body = HealthResponse),
    ),
    tag = "service",
)]
pub async fn handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let mut components = BTreeMap::new();

    let (store, redis) = tokio::join!(check_store(&state), async {
        match state.cache.as_deref() {
            Some(cache) => Some(check_redis(cache).await),
            None => None,
        }
    });

    let store_unhealthy = store.status == HealthStatus::Unhealthy;
    components.insert(format!("store_{}", state.store.backend()), store);
    if let Some(redis) = redis {
        components.insert("redis_cache".to_string(), redis);
    }

    let critical_unhealthy = state.shutdown.is_shutting_down() || store_unhealthy;
    let any_unhealthy = components
        .values()
        .any(|c| c.status == HealthStatus::Unhealthy);

    let overall = if critical_unhealthy {
        HealthStatus::Unhealthy
    } else if any_unhealthy {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    let status_code = if overall == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status_code,
        Json(HealthResponse {
            status: overall,
            components,
        }),
    )
}

fn component(
    result: Result<Result<(), String>, tokio::time::error::Elapsed>,
    start: Instant,
) -> ComponentHealth {
    let latency_ms = Some(start.elapsed().as_millis() as u64);

    match result {
        Ok(Ok(())) => ComponentHealth {
            status: HealthStatus::Healthy,
            latency_ms,
            error: None,
        },
        Ok(Err(e)) => ComponentHealth {
            status: HealthStatus::Unhealthy,
            latency_ms,
            error: Some(e),
        },
        Err(_) => ComponentHealth {
            status: HealthStatus::Unhealthy,
            latency_ms,
            error: Some("timeout".to_string()),
        },
    }
}

async fn check_store(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    let result = tokio::time::timeout(STORE_TIMEOUT, async {
        state.store.ping().await.map_err(|e| e.to_string())
    })
    .await;

    component(result, start)
}

async fn check_redis(cache: &dyn redis_cache::Cache) -> ComponentHealth {
    let start = Instant::now();
    let result = tokio::time::timeout(REDIS_TIMEOUT, async {
        cache.ping().await.map_err(|e| e.to_string())
    })
    .await;

    component(result, start)
}

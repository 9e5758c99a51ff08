//! Live (not persisted) lookups, optionally served from Redis.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use redis_cache::CacheError;
use serde::de::DeserializeOwned;
use weather_client::location::normalize;
use weather_client::{
    Forecast, WeatherClientResult, WeatherProvider, WeatherReport,
};

use crate::AppState;

/// Upper bound on a single cache read or write on the request path.
pub const CACHE_TIMEOUT: Duration = Duration::from_millis(500);

pub fn live_cache_key(location: &str) -> String {
    format!("weather:live:{}", normalize(location))
}

pub fn forecast_cache_key(location: &str) -> String {
    format!("weather:forecast:{}", normalize(location))
}

#[tracing::instrument(skip(state))]
pub async fn live_report(
    state: &AppState,
    location: &str,
) -> WeatherClientResult<WeatherReport> {
    let provider = state.provider.clone();
    cached(state, live_cache_key(location), || async move {
        provider.lookup(location).await
    })
    .await
}

#[tracing::instrument(skip(state))]
pub async fn forecast(
    state: &AppState,
    location: &str,
) -> WeatherClientResult<Forecast> {
    let provider = state.provider.clone();
    cached(state, forecast_cache_key(location), || async move {
        let resolved = provider.resolve(location).await?;
        provider.forecast_for(&resolved).await
    })
    .await
}

/// Returns the cached value for `key` or runs `fetch` and caches its result.
///
/// Cache failures and slow cache calls are logged and otherwise ignored.
async fn cached<T, F, Fut>(
    state: &AppState,
    key: String,
    fetch: F,
) -> WeatherClientResult<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = WeatherClientResult<T>>,
{
    if let Some(hit) = read_cache::<T>(state, &key).await {
        tracing::debug!(%key, "weather cache hit");
        record(state, "cache", "hit");
        return Ok(hit);
    }

    let result = fetch().await;
    let outcome = match &result {
        Ok(_) => "success",
        Err(e) if e.is_upstream() => "error",
        Err(_) => "rejected",
    };
    record(state, "upstream", outcome);

    if let Ok(value) = &result {
        write_cache(state, &key, value).await;
    }
    result
}

fn record(state: &AppState, source: &str, outcome: &str) {
    state
        .telemetry
        .maybe_use_metrics(|m| m.record_lookup(source, outcome));
}

async fn read_cache<T: DeserializeOwned>(
    state: &AppState,
    key: &str,
) -> Option<T> {
    let cache = state.cache.as_deref()?;
    bounded(redis_cache::get_json(cache, key))
        .await
        .inspect_err(|e| tracing::warn!(error = %e, %key, "weather cache read failed"))
        .ok()
        .flatten()
}

async fn write_cache<T: Serialize>(state: &AppState, key: &str, value: &T) {
    let Some(cache) = state.cache.as_deref() else {
        return;
    };

    let ttl = state.config.live_cache_ttl_seconds;
    if let Err(e) = bounded(redis_cache::set_json(cache, key, value, ttl)).await {
        tracing::warn!(error = %e, %key, "weather cache write failed");
    }
}

async fn bounded<T>(
    call: impl Future<Output = Result<T, CacheError>>,
) -> Result<T, CacheError> {
    tokio::time::timeout(CACHE_TIMEOUT, call)
        .await
        .unwrap_or(Err(CacheError::Timeout(CACHE_TIMEOUT)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_keys_ignore_case_and_spacing() {
        assert_eq!(live_cache_key("  New  York "), "weather:live:new york");
        assert_eq!(live_cache_key("new york"), live_cache_key("NEW YORK"));
        assert_ne!(forecast_cache_key("Paris"), live_cache_key("Paris"));
    }
}

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::{WeatherClientError, WeatherClientResult, truncate_body};

/// Sends `request` and decodes a 2xx JSON body.
///
/// Non-2xx bodies are only logged, truncated; callers never see them.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> WeatherClientResult<T> {
    let response = request
        .send()
        .await
        .map_err(|e| WeatherClientError::from_transport(service, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| WeatherClientError::from_transport(service, e))?;

    if !status.is_success() {
        tracing::warn!(
            service,
            status = status.as_u16(),
            body = %truncate_body(&body),
            "upstream returned an error status"
        );
        return Err(WeatherClientError::Upstream {
            service,
            message: format!("status {status}"),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::warn!(
            service,
            error = %e,
            body = %truncate_body(&body),
            "upstream body could not be parsed"
        );
        WeatherClientError::InvalidResponse {
            service,
            message: e.to_string(),
        }
    })
}

use std::time::Duration;

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderName};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;
use weather_client::{Forecast, WeatherReport};

use crate::error::{HistoryClientError, HistoryClientResult};
use crate::models::{
    CreateQueryRequest, ErrorBody, ExportedFile, QueryRecord, UpdateQueryRequest,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Async client for the weather history API.
///
/// The base URL is fixed at construction; every path is resolved under
/// `<base>/api/`.
#[derive(Debug, Clone)]
pub struct HistoryClient {
    http: Client,
    base_url: Url,
}

impl HistoryClient {
    pub fn new(base_url: &str) -> HistoryClientResult<Self> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Self::with_http_client(base_url, http)
    }

    pub fn with_http_client(base_url: &str, http: Client) -> HistoryClientResult<Self> {
        let mut base_url = Url::parse(base_url.trim())?;
        let path = format!("{}/", base_url.path().trim_end_matches('/'));
        base_url.set_path(&path);

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> HistoryClientResult<Url> {
        Ok(self.base_url.join(&format!("api/{path}"))?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn live_weather(&self, location: &str) -> HistoryClientResult<WeatherReport> {
        let request = self
            .http
            .get(self.endpoint("weather/live")?)
            .query(&[("location", location)]);
        decode(request.send().await?).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn forecast(&self, location: &str) -> HistoryClientResult<Forecast> {
        let request = self
            .http
            .get(self.endpoint("weather/forecast")?)
            .query(&[("location", location)]);
        decode(request.send().await?).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_query(
        &self,
        request: &CreateQueryRequest,
    ) -> HistoryClientResult<QueryRecord> {
        let response = self
            .http
            .post(self.endpoint("weather/query")?)
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn list_queries(&self) -> HistoryClientResult<Vec<QueryRecord>> {
        let response = self.http.get(self.endpoint("weather/query")?).send().await?;
        decode(response).await
    }

    pub async fn get_query(&self, id: Uuid) -> HistoryClientResult<QueryRecord> {
        let response = self
            .http
            .get(self.endpoint(&format!("weather/query/{id}"))?)
            .send()
            .await?;
        decode(response).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_query(
        &self,
        id: Uuid,
        request: &UpdateQueryRequest,
    ) -> HistoryClientResult<QueryRecord> {
        let response = self
            .http
            .put(self.endpoint(&format!("weather/query/{id}"))?)
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_query(&self, id: Uuid) -> HistoryClientResult<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("weather/query/{id}"))?)
            .send()
            .await?;
        ensure_success(response).await.map(|_| ())
    }

    /// Downloads an export; `format` is one of `json`, `csv`, `xml`, `pdf`.
    #[tracing::instrument(skip(self))]
    pub async fn export(&self, format: &str) -> HistoryClientResult<ExportedFile> {
        let response = self
            .http
            .get(self.endpoint(&format!("export/{format}"))?)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let content_type = header_text(&response, CONTENT_TYPE);
        let file_name = header_text(&response, CONTENT_DISPOSITION).and_then(|value| {
            value
                .split(';')
                .filter_map(|part| part.trim().strip_prefix("filename="))
                .map(|name| name.trim_matches('"').to_string())
                .next()
        });

        Ok(ExportedFile {
            content_type,
            file_name,
            bytes: response.bytes().await?,
        })
    }
}

fn header_text(response: &Response, name: HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn ensure_success(response: Response) -> HistoryClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.detail)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(|reason| format!("Request failed: {reason}"))
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
        });

    tracing::debug!(status = status.as_u16(), %detail, "API request failed");
    Err(HistoryClientError::Api {
        status: status.as_u16(),
        detail,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> HistoryClientResult<T> {
    let response = ensure_success(response).await?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| HistoryClientError::Decode(e.to_string()))
}

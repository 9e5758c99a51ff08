use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use postgres_models::models::weather_query::NewWeatherQuery;
use uuid::Uuid;
use weather_client::WeatherProvider;

use crate::AppState;
use crate::store::QueryStore;
use crate::shared::extractors::request_id::RequestId;
use crate::shared::extractors::validations::ValidatedPayload;
use crate::weather_api::api_error::ApiV1Error;
use crate::weather_api::core::weather::errors::{self, HandlerResult};
use crate::weather_api::error_recorder::ErrorRecorder;

use super::models::{
    CreateQueryRequest, UpdateQueryRequest, WeatherQueryResponse,
};

fn parse_id(raw: &str) -> Result<Uuid, errors::Error> {
    Uuid::parse_str(raw).map_err(|_| errors::Error::InvalidId(raw.to_string()))
}

/// Search a location and save the result to history
///
/// Always fetches fresh weather; the live lookup cache is not used.
#[utoipa::path(
    post,
    path = "/weather/query",
    request_body = CreateQueryRequest,
    responses(
        (status = 201, description = "Saved weather query", body = WeatherQueryResponse),
        (status = 400, description = "Invalid request", body = ApiV1Error),
        (status = 404, description = "Location could not be resolved", body = ApiV1Error),
        (status = 502, description = "Weather provider unavailable", body = ApiV1Error),
        (status = 504, description = "Weather provider timed out", body = ApiV1Error),
    ),
    tag = "history",
)]
#[tracing::instrument(skip_all, name = "weather_query_create")]
pub async fn create(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedPayload(payload): ValidatedPayload<CreateQueryRequest>,
) -> HandlerResult<(StatusCode, Json<WeatherQueryResponse>)> {
    tracing::info!(
        location_input = %payload.location_input,
        start_date = ?payload.start_date,
        end_date = ?payload.end_date,
        %request_id,
        "Create weather query",
    );

    let recorder =
        ErrorRecorder::new(&state.telemetry, "weather_query_create", &request_id);

    let report = state
        .provider
        .lookup(&payload.location_input)
        .await
        .map_err(|e| recorder.record(errors::Error::Lookup(e)))?;

    let entry = NewWeatherQuery {
        id: Uuid::now_v7(),
        resolved_location: report.location.display_name.clone(),
        weather_result: report.to_json(),
        location_input: payload.location_input,
        start_date: payload.start_date,
        end_date: payload.end_date,
        created_at: Utc::now(),
    };

    let created = state
        .store
        .create(entry)
        .await
        .map_err(|e| recorder.record(errors::Error::Store(e)))?;

    tracing::info!(id = %created.id, resolved_location = %created.resolved_location, "Weather query saved");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// All saved weather queries, newest first
#[utoipa::path(
    get,
    path = "/weather/query",
    responses(
        (status = 200, description = "Saved weather queries", body = Vec<WeatherQueryResponse>),
        (status = 500, description = "Internal server error", body = ApiV1Error),
    ),
    tag = "history",
)]
#[tracing::instrument(skip_all, name = "weather_query_list")]
pub async fn list(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
) -> HandlerResult<Json<Vec<WeatherQueryResponse>>> {
    let recorder =
        ErrorRecorder::new(&state.telemetry, "weather_query_list", &request_id);

    let queries = state
        .store
        .list()
        .await
        .map_err(|e| recorder.record(errors::Error::Store(e)))?;

    Ok(Json(queries.into_iter().map(Into::into).collect()))
}

/// One saved weather query
#[utoipa::path(
    get,
    path = "/weather/query/{id}",
    params(("id" = String, Path, description = "Weather query id")),
    responses(
        (status = 200, description = "Saved weather query", body = WeatherQueryResponse),
        (status = 404, description = "Unknown or malformed id", body = ApiV1Error),
    ),
    tag = "history",
)]
#[tracing::instrument(skip_all, name = "weather_query_get")]
pub async fn get(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Path(raw_id): Path<String>,
) -> HandlerResult<Json<WeatherQueryResponse>> {
    let recorder =
        ErrorRecorder::new(&state.telemetry, "weather_query_get", &request_id);

    let id = parse_id(&raw_id).map_err(|e| recorder.record(e))?;
    let query = state
        .store
        .get(id)
        .await
        .map_err(|e| recorder.record(errors::Error::Store(e)))?;

    Ok(Json(query.into()))
}

/// Edit the location text or dates of a saved query
///
/// Stored weather and the resolved location are left as they are.
#[utoipa::path(
    put,
    path = "/weather/query/{id}",
    params(("id" = String, Path, description = "Weather query id")),
    request_body = UpdateQueryRequest,
    responses(
        (status = 200, description = "Updated weather query", body = WeatherQueryResponse),
        (status = 400, description = "Invalid request or date range", body = ApiV1Error),
        (status = 404, description = "Unknown or malformed id", body = ApiV1Error),
    ),
    tag = "history",
)]
#[tracing::instrument(skip_all, name = "weather_query_update")]
pub async fn update(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Path(raw_id): Path<String>,
    ValidatedPayload(payload): ValidatedPayload<UpdateQueryRequest>,
) -> HandlerResult<Json<WeatherQueryResponse>> {
    let recorder =
        ErrorRecorder::new(&state.telemetry, "weather_query_update", &request_id);

    let id = parse_id(&raw_id).map_err(|e| recorder.record(e))?;
    let updated = state
        .store
        .update(id, payload.into())
        .await
        .map_err(|e| recorder.record(errors::Error::Store(e)))?;

    tracing::info!(%id, "Weather query updated");
    Ok(Json(updated.into()))
}

/// Delete a saved query
#[utoipa::path(
    delete,
    path = "/weather/query/{id}",
    params(("id" = String, Path, description = "Weather query id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown or malformed id", body = ApiV1Error),
    ),
    tag = "history",
)]
#[tracing::instrument(skip_all, name = "weather_query_delete")]
pub async fn delete(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Path(raw_id): Path<String>,
) -> HandlerResult<StatusCode> {
    let recorder =
        ErrorRecorder::new(&state.telemetry, "weather_query_delete", &request_id);

    let id = parse_id(&raw_id).map_err(|e| recorder.record(e))?;
    state
        .store
        .delete(id)
        .await
        .map_err(|e| recorder.record(errors::Error::Store(e)))?;

    tracing::info!(%id, "Weather query deleted");
    Ok(StatusCode::NO_CONTENT)
}

use axum::Json;
use axum::extract::State;
use weather_client::Forecast;

use crate::AppState;
use crate::weather_api::api_error::ApiV1Error;
use crate::shared::extractors::request_id::RequestId;
use crate::shared::extractors::validations::ValidatedQuery;
use crate::weather_api::core::weather::errors::{self, HandlerResult};
use crate::weather_api::core::weather::live::models::LocationQuery;
use crate::weather_api::core::weather::lookup;
use crate::weather_api::error_recorder::ErrorRecorder;

const HANDLER_NAME: &str = "weather_forecast";

/// Forecast only for a location, without saving it
#[utoipa::path(
    get,
    path = "/weather/forecast",
    params(LocationQuery),
    responses(
        (status = 200, description = "Forecast points in provider granularity"),
        (status = 400, description = "Missing or blank location", body = ApiV1Error),
        (status = 404, description = "Location could not be resolved", body = ApiV1Error),
        (status = 502, description = "Weather provider unavailable", body = ApiV1Error),
    ),
    tag = "weather",
)]
#[tracing::instrument(skip_all, name = "weather_forecast")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedQuery(query): ValidatedQuery<LocationQuery>,
) -> HandlerResult<Json<Forecast>> {
    let recorder =
        ErrorRecorder::new(&state.telemetry, HANDLER_NAME, &request_id);

    let forecast = lookup::forecast(&state, &query.location)
        .await
        .map_err(|e| recorder.record(errors::Error::Lookup(e)))?;

    Ok(Json(forecast))
}

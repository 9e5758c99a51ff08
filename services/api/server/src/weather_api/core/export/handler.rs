use axum::extract::{Path, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use export_renderer::{ExportFormat, ExportRecord};
use postgres_models::models::weather_query::WeatherQuery;

use crate::AppState;
use crate::shared::extractors::request_id::RequestId;
use crate::store::QueryStore;
use crate::weather_api::api_error::ApiV1Error;
use crate::weather_api::error_recorder::ErrorRecorder;

use super::errors::{self, HandlerResult};

const HANDLER_NAME: &str = "export";

fn to_record(query: WeatherQuery) -> ExportRecord {
    ExportRecord {
        id: query.id,
        location_input: query.location_input,
        resolved_location: query.resolved_location,
        start_date: query.start_date,
        end_date: query.end_date,
        weather_result: query.weather_result,
        created_at: query.created_at,
    }
}

/// Download the whole history as a file
#[utoipa::path(
    get,
    path = "/export/{format}",
    params(("format" = String, Path, description = "One of json, csv, xml, pdf")),
    responses(
        (status = 200, description = "Attachment named weather_queries.<format>"),
        (status = 404, description = "Unsupported format", body = ApiV1Error),
        (status = 500, description = "Export failed", body = ApiV1Error),
    ),
    tag = "history",
)]
#[tracing::instrument(skip_all, name = "export")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Path(raw_format): Path<String>,
) -> HandlerResult<Response> {
    let recorder = ErrorRecorder::new(&state.telemetry, HANDLER_NAME, &request_id);

    let format: ExportFormat = raw_format
        .parse()
        .map_err(|_| recorder.record(errors::Error::UnknownFormat(raw_format.clone())))?;

    let records: Vec<ExportRecord> = state
        .store
        .list()
        .await
        .map_err(|e| recorder.record(errors::Error::Store(e)))?
        .into_iter()
        .map(to_record)
        .collect();
    let count = records.len();

    let export = tokio::task::spawn_blocking(move || {
        export_renderer::render(format, &records)
    })
    .await
    .map_err(|e| recorder.record(errors::Error::Task(e)))?
    .map_err(|e| recorder.record(errors::Error::Render(e)))?;

    state
        .telemetry
        .maybe_use_metrics(|m| m.record_export(format.extension()));
    tracing::info!(%format, count, bytes = export.bytes.len(), "Export rendered");

    let disposition = HeaderValue::from_str(&export.content_disposition())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(export.content_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.bytes,
    )
        .into_response())
}

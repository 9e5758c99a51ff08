use export_renderer::ExportError;
use uuid::Uuid;

use crate::store::StoreError;
use crate::weather_api::api_error::{ApiV1Detail, ApiV1Error};
use crate::weather_api::error_recorder::IntoApiV1Error;

pub type HandlerResult<T> = Result<T, ApiV1Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported export format: {0}")]
    UnknownFormat(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(ExportError),

    #[error("Export task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoApiV1Error for Error {
    fn error_code(&self) -> &'static str {
        match self {
            Error::UnknownFormat(_) => "unknown_format",
            Error::Store(StoreError::Pool(_)) => "pool_error",
            Error::Store(_) => "database_error",
            Error::Render(_) | Error::Task(_) => "render_error",
        }
    }

    fn into_api_v1_error(self, request_id: &Uuid) -> ApiV1Error {
        let request_id = request_id.to_string();
        let code = self.error_code();

        match self {
            Error::UnknownFormat(format) => ApiV1Error::not_found(
                format!("Unsupported export format: {format}"),
                vec![ApiV1Detail::new(
                    Some("format"),
                    code,
                    "Use one of json, csv, xml or pdf",
                )],
                request_id,
            ),
            Error::Store(StoreError::Pool(e)) => {
                ApiV1Error::service_unavailable(
                    "Service temporarily unavailable".to_string(),
                    vec![ApiV1Detail::new(None, code, e)],
                    request_id,
                )
            }
            Error::Store(e) => ApiV1Error::internal_server_error(
                "Could not load weather queries".to_string(),
                vec![ApiV1Detail::new(None, code, e.to_string())],
                request_id,
            ),
            e @ (Error::Render(_) | Error::Task(_)) => {
                ApiV1Error::internal_server_error(
                    "Export failed".to_string(),
                    vec![ApiV1Detail::new(None, code, e.to_string())],
                    request_id,
                )
            }
        }
    }
}

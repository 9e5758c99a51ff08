use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON error body returned by every `/api` endpoint.
///
/// `detail` is the message clients show to users.
#[derive(Serialize, Deserialize, Default, ToSchema)]
pub struct ApiV1Error {
    #[serde(skip)]
    pub(crate) status_code: StatusCode,
    #[schema(example = "Weather query not found")]
    pub(crate) detail: String,
    #[schema(example = "not_found")]
    pub(crate) code: String,
    pub(crate) details: Vec<ApiV1Detail>,
    pub(crate) timestamp: String,
    pub(crate) request_id: String,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, ToSchema)]
pub struct ApiV1Detail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) field: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) message: String,
}

impl ApiV1Detail {
    pub fn new(
        field: Option<&str>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.map(str::to_string),
            code: code.into(),
            message: message.into(),
        }
    }
}

impl ApiV1Error {
    pub fn new(
        status_code: StatusCode,
        code: &str,
        detail: String,
        details: Vec<ApiV1Detail>,
        request_id: String,
    ) -> Self {
        Self {
            status_code,
            detail,
            code: code.to_string(),
            details,
            timestamp: Utc::now().to_rfc3339(),
            request_id,
        }
    }

    pub fn bad_request(
        detail: String,
        details: Vec<ApiV1Detail>,
        request_id: String,
    ) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "validation_error",
            detail,
            details,
            request_id,
        )
    }

    pub fn not_found(
        detail: String,
        details: Vec<ApiV1Detail>,
        request_id: String,
    ) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", detail, details, request_id)
    }

    pub fn bad_gateway(
        detail: String,
        details: Vec<ApiV1Detail>,
        request_id: String,
    ) -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            "upstream_unavailable",
            detail,
            details,
            request_id,
        )
    }

    pub fn gateway_timeout(
        detail: String,
        details: Vec<ApiV1Detail>,
        request_id: String,
    ) -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            "upstream_timeout",
            detail,
            details,
            request_id,
        )
    }

    pub fn internal_server_error(
        detail: String,
        details: Vec<ApiV1Detail>,
        request_id: String,
    ) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            detail,
            details,
            request_id,
        )
    }

    pub fn service_unavailable(
        detail: String,
        details: Vec<ApiV1Detail>,
        request_id: String,
    ) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "service_unavailable",
            detail,
            details,
            request_id,
        )
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl axum::response::IntoResponse for ApiV1Error {
    fn into_response(self) -> axum::response::Response {
        if self.status_code.is_server_error() {
            sentry::Hub::with_active(|hub| hub.capture_error(&self));
        }

        (self.status_code, axum::Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiV1Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}, {}, {}",
            self.status_code,
            self.detail,
            self.request_id,
            self.details
                .iter()
                .map(|d| d.message.clone())
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

impl std::fmt::Debug for ApiV1Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Error")
            .field("status_code", &self.status_code)
            .field("code", &self.code)
            .field("detail", &self.detail)
            .field("details", &self.details)
            .field("timestamp", &self.timestamp)
            .field("request_id", &self.request_id)
            .finish()
    }
}

impl std::error::Error for ApiV1Error {}

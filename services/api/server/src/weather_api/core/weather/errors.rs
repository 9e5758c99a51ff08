use uuid::Uuid;
use weather_client::WeatherClientError;

use crate::store::StoreError;
use crate::weather_api::api_error::{ApiV1Detail, ApiV1Error};
use crate::weather_api::error_recorder::IntoApiV1Error;

pub type HandlerResult<T> = Result<T, ApiV1Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lookup(#[from] WeatherClientError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid weather query id: {0}")]
    InvalidId(String),
}

impl IntoApiV1Error for Error {
    fn error_code(&self) -> &'static str {
        match self {
            Error::Lookup(WeatherClientError::EmptyLocation) => "empty_location",
            Error::Lookup(WeatherClientError::LocationNotFound(_)) => {
                "location_not_found"
            }
            Error::Lookup(WeatherClientError::Timeout { .. }) => {
                "upstream_timeout"
            }
            Error::Lookup(_) => "upstream_unavailable",
            Error::Store(StoreError::NotFound(_)) | Error::InvalidId(_) => {
                "not_found"
            }
            Error::Store(StoreError::InvalidDateRange) => "invalid_date_range",
            Error::Store(StoreError::Database(_)) => "database_error",
            Error::Store(StoreError::Pool(_)) => "pool_error",
        }
    }

    fn into_api_v1_error(self, request_id: &Uuid) -> ApiV1Error {
        let request_id = request_id.to_string();
        let code = self.error_code();

        match self {
            Error::Lookup(WeatherClientError::EmptyLocation) => {
                ApiV1Error::bad_request(
                    "Location must not be empty".to_string(),
                    vec![ApiV1Detail::new(
                        Some("location"),
                        code,
                        "Provide a city, postal code, landmark or \"lat,lon\" pair",
                    )],
                    request_id,
                )
            }
            Error::Lookup(WeatherClientError::LocationNotFound(input)) => {
                ApiV1Error::not_found(
                    format!("Location not found: {input}"),
                    vec![ApiV1Detail::new(
                        Some("location"),
                        code,
                        "Try a more specific place name",
                    )],
                    request_id,
                )
            }
            Error::Lookup(WeatherClientError::Timeout { service }) => {
                ApiV1Error::gateway_timeout(
                    "Weather service did not respond in time".to_string(),
                    vec![ApiV1Detail::new(
                        None,
                        code,
                        format!("{service} timed out"),
                    )],
                    request_id,
                )
            }
            Error::Lookup(e) => ApiV1Error::bad_gateway(
                "Weather service is currently unavailable".to_string(),
                vec![ApiV1Detail::new(None, code, e.to_string())],
                request_id,
            ),
            Error::Store(StoreError::NotFound(id)) => ApiV1Error::not_found(
                "Weather query not found".to_string(),
                vec![ApiV1Detail::new(
                    Some("id"),
                    code,
                    format!("No weather query with id {id}"),
                )],
                request_id,
            ),
            Error::InvalidId(raw) => ApiV1Error::not_found(
                "Weather query not found".to_string(),
                vec![ApiV1Detail::new(
                    Some("id"),
                    code,
                    format!("'{raw}' is not a valid weather query id"),
                )],
                request_id,
            ),
            Error::Store(StoreError::InvalidDateRange) => {
                ApiV1Error::bad_request(
                    "start_date must be on or before end_date".to_string(),
                    vec![ApiV1Detail::new(
                        Some("start_date"),
                        code,
                        "start_date must be on or before end_date",
                    )],
                    request_id,
                )
            }
            Error::Store(StoreError::Database(e)) => {
                ApiV1Error::internal_server_error(
                    "Weather query storage failed".to_string(),
                    vec![ApiV1Detail::new(
                        None,
                        code,
                        format!("Database error: {e}"),
                    )],
                    request_id,
                )
            }
            Error::Store(StoreError::Pool(e)) => {
                ApiV1Error::service_unavailable(
                    "Service temporarily unavailable".to_string(),
                    vec![ApiV1Detail::new(
                        None,
                        code,
                        format!("Failed to get database connection: {e}"),
                    )],
                    request_id,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_of(e: Error) -> StatusCode {
        e.into_api_v1_error(&Uuid::now_v7()).status_code()
    }

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(
            status_of(Error::Lookup(WeatherClientError::EmptyLocation)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(Error::Lookup(WeatherClientError::LocationNotFound(
                "x".into()
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(Error::Lookup(WeatherClientError::Timeout {
                service: "geocoder"
            })),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(Error::Lookup(WeatherClientError::Upstream {
                service: "weather provider",
                message: "status 500".into()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(Error::InvalidId("abc".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(Error::Store(StoreError::InvalidDateRange)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(Error::Store(StoreError::Pool("timed out".into()))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(Error::Store(StoreError::Database(
                diesel::result::Error::NotFound
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

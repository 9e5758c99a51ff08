use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use postgres_models::models::weather_query::{
    WeatherQuery, WeatherQueryChangeset, is_valid_date_range,
};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::weather_api::core::weather::live::models::validate_location;

/// Search a location and save the result to history
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_range", skip_on_field_errors = false))]
pub struct CreateQueryRequest {
    #[schema(example = "Paris")]
    #[validate(custom(function = "validate_location"))]
    pub location_input: String,

    #[schema(example = "2025-06-01")]
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[schema(example = "2025-06-05")]
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Partial update of a saved query.
///
/// Absent fields keep their value; `null` clears a date.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_update_range", skip_on_field_errors = false))]
pub struct UpdateQueryRequest {
    #[schema(example = "Lyon")]
    #[validate(custom(function = "validate_location"))]
    pub location_input: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2025-06-02")]
    #[serde(default, deserialize_with = "present_or_null")]
    pub start_date: Option<Option<NaiveDate>>,

    #[schema(value_type = Option<String>, format = Date)]
    #[serde(default, deserialize_with = "present_or_null")]
    pub end_date: Option<Option<NaiveDate>>,
}

/// A saved weather query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherQueryResponse {
    pub id: Uuid,
    #[schema(example = "Paris")]
    pub location_input: String,
    #[schema(example = "Paris, Ile-de-France, Metropolitan France, France")]
    pub resolved_location: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// `{ location, current, forecast }` as fetched at creation
    #[schema(value_type = Object)]
    pub weather_result: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<WeatherQuery> for WeatherQueryResponse {
    fn from(query: WeatherQuery) -> Self {
        Self {
            id: query.id,
            location_input: query.location_input,
            resolved_location: query.resolved_location,
            start_date: query.start_date,
            end_date: query.end_date,
            weather_result: query.weather_result,
            created_at: query.created_at,
        }
    }
}

impl From<UpdateQueryRequest> for WeatherQueryChangeset {
    fn from(request: UpdateQueryRequest) -> Self {
        Self {
            location_input: request.location_input,
            start_date: request.start_date,
            end_date: request.end_date,
        }
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn date_range_error() -> ValidationError {
    ValidationError::new("invalid_date_range").with_message(Cow::Borrowed(
        "start_date must be on or before end_date",
    ))
}

fn validate_create_range(
    request: &CreateQueryRequest,
) -> Result<(), ValidationError> {
    if is_valid_date_range(request.start_date, request.end_date) {
        Ok(())
    } else {
        Err(date_range_error())
    }
}

/// Only checks dates both sent in this request; the merged range is checked
/// by the store.
fn validate_update_range(
    request: &UpdateQueryRequest,
) -> Result<(), ValidationError> {
    match (request.start_date, request.end_date) {
        (Some(start), Some(end)) if !is_valid_date_range(start, end) => {
            Err(date_range_error())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn update_distinguishes_absent_from_null() {
        let request: UpdateQueryRequest =
            serde_json::from_str(r#"{"end_date": null}"#).unwrap();
        assert_eq!(request.start_date, None);
        assert_eq!(request.end_date, Some(None));
        assert_eq!(request.location_input, None);

        let request: UpdateQueryRequest =
            serde_json::from_str(r#"{"start_date": "2025-06-02"}"#).unwrap();
        assert_eq!(
            request.start_date,
            Some(NaiveDate::from_ymd_opt(2025, 6, 2))
        );
    }

    #[test]
    fn create_rejects_reversed_dates_and_blank_location() {
        let request: CreateQueryRequest = serde_json::from_str(
            r#"{"location_input": "Paris", "start_date": "2025-06-05", "end_date": "2025-06-01"}"#,
        )
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));

        let request: CreateQueryRequest =
            serde_json::from_str(r#"{"location_input": "  "}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("location_input"));
    }

    #[test]
    fn update_validation() {
        let request: UpdateQueryRequest = serde_json::from_str(
            r#"{"start_date": "2025-06-05", "end_date": "2025-06-01"}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());

        let request: UpdateQueryRequest =
            serde_json::from_str(r#"{"location_input": ""}"#).unwrap();
        assert!(request.validate().is_err());

        assert!(UpdateQueryRequest::default().validate().is_ok());
    }
}

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use weather_client::WeatherReport;

/// A stored weather query as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: Uuid,
    pub location_input: String,
    pub resolved_location: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub weather_result: WeatherReport,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateQueryRequest {
    pub location_input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl CreateQueryRequest {
    pub fn new(location_input: impl Into<String>) -> Self {
        Self {
            location_input: location_input.into(),
            ..Default::default()
        }
    }
}

/// Partial update. `None` fields are not sent; `Some(None)` sends `null`,
/// which clears a date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateQueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub content_type: Option<String>,
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<String>,
}

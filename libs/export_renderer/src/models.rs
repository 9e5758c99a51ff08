use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ExportError;

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Xml,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Json,
        ExportFormat::Csv,
        ExportFormat::Xml,
        ExportFormat::Pdf,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Xml => "xml",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xml => "application/xml",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn file_name(&self) -> String {
        format!("weather_queries.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ExportError::UnknownFormat(s.to_string()))
    }
}

/// One stored weather query, as exported.
///
/// Field order matches the API representation so the JSON export is the same
/// document a client gets from the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub id: Uuid,
    pub location_input: String,
    pub resolved_location: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub weather_result: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl ExportRecord {
    /// `weather_result.current.main.temp`
    pub fn temperature(&self) -> Option<f64> {
        self.weather_result
            .pointer("/current/main/temp")
            .and_then(serde_json::Value::as_f64)
    }

    /// `weather_result.current.weather[0].description`
    pub fn weather(&self) -> Option<&str> {
        self.weather_result
            .pointer("/current/weather/0/description")
            .and_then(serde_json::Value::as_str)
    }

    pub(crate) fn temperature_text(&self) -> String {
        self.temperature()
            .map(|t| t.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub(crate) fn weather_text(&self) -> &str {
        self.weather().unwrap_or(NOT_AVAILABLE)
    }

    pub(crate) fn created_at_text(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

pub(crate) fn date_text(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

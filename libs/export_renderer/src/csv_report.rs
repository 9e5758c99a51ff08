use crate::error::{ExportError, ExportResult};
use crate::models::{ExportRecord, date_text};

pub(crate) const HEADER: [&str; 8] = [
    "ID",
    "Location Input",
    "Resolved Location",
    "Start Date",
    "End Date",
    "Created At",
    "Temperature (°C)",
    "Weather",
];

pub(crate) fn render(records: &[ExportRecord]) -> ExportResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for record in records {
        writer.write_record([
            record.id.to_string(),
            record.location_input.clone(),
            record.resolved_location.clone(),
            date_text(record.start_date),
            date_text(record.end_date),
            record.created_at_text(),
            record.temperature_text(),
            record.weather_text().to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))
}

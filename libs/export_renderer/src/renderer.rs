use crate::error::ExportResult;
use crate::models::{ExportFormat, ExportRecord};
use crate::{csv_report, json_report, pdf_report, xml_report};

/// A finished export, ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct RenderedExport {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl RenderedExport {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename={}", self.format.file_name())
    }
}

/// Renders `records` in the given order. CPU bound, run it off the async
/// executor.
pub fn render(format: ExportFormat, records: &[ExportRecord]) -> ExportResult<RenderedExport> {
    let bytes = match format {
        ExportFormat::Json => json_report::render(records)?,
        ExportFormat::Csv => csv_report::render(records)?,
        ExportFormat::Xml => xml_report::render(records)?,
        ExportFormat::Pdf => pdf_report::render(records)?,
    };

    Ok(RenderedExport { format, bytes })
}

pub mod error;
pub mod models;
pub mod renderer;

mod csv_report;
mod json_report;
mod pdf_report;
mod xml_report;

#[cfg(test)]
mod tests;

pub use error::{ExportError, ExportResult};
pub use models::{ExportFormat, ExportRecord};
pub use renderer::{RenderedExport, render};

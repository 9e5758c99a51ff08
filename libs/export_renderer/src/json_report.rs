use crate::error::ExportResult;
use crate::models::ExportRecord;

pub(crate) fn render(records: &[ExportRecord]) -> ExportResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

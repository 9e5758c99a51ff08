use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::error::{ExportError, ExportResult};
use crate::models::ExportRecord;

pub(crate) const TITLE: &str = "Weather Queries Report";

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 12.0;
const TITLE_SIZE: f32 = 16.0;
const HEADER_SIZE: f32 = 9.0;
const BODY_SIZE: f32 = 8.0;
const ROW_HEIGHT: f32 = 6.0;
const TABLE_TOP: f32 = PAGE_HEIGHT - MARGIN - 14.0;

/// Column title, left edge in mm, and maximum characters before truncation.
pub(crate) const COLUMNS: [(&str, f32, usize); 6] = [
    ("ID", MARGIN, 36),
    ("Location", 70.0, 20),
    ("Resolved Location", 110.0, 30),
    ("Temperature", 170.0, 12),
    ("Weather", 195.0, 20),
    ("Date", 237.0, 25),
];

pub(crate) fn rows_per_page() -> usize {
    ((TABLE_TOP - ROW_HEIGHT - MARGIN) / ROW_HEIGHT).floor() as usize
}

/// Table cells for every record, truncated and split into pages. Always at
/// least one page, so an empty store still produces a titled report.
pub(crate) fn layout(records: &[ExportRecord]) -> Vec<Vec<[String; 6]>> {
    let rows: Vec<[String; 6]> = records.iter().map(row).collect();
    if rows.is_empty() {
        return vec![Vec::new()];
    }
    rows.chunks(rows_per_page()).map(<[_]>::to_vec).collect()
}

fn row(record: &ExportRecord) -> [String; 6] {
    let cells = [
        record.id.to_string(),
        record.location_input.clone(),
        record.resolved_location.clone(),
        temperature_cell(record),
        record.weather_text().to_string(),
        record.created_at.format("%Y-%m-%d %H:%M").to_string(),
    ];
    let mut out: [String; 6] = Default::default();
    for (i, cell) in cells.iter().enumerate() {
        out[i] = fit(cell, COLUMNS[i].2);
    }
    out
}

fn temperature_cell(record: &ExportRecord) -> String {
    match record.temperature() {
        Some(t) => format!("{t} °C"),
        None => record.temperature_text(),
    }
}

/// Truncates to `max` characters and replaces what the builtin fonts cannot
/// encode. Builtin fonts use WinAnsiEncoding, which matches Latin-1 for
/// printable characters.
pub(crate) fn fit(text: &str, max: usize) -> String {
    text.chars()
        .take(max)
        .map(|c| if c <= '\u{FF}' && !c.is_control() { c } else { '?' })
        .collect()
}

pub(crate) fn render(records: &[ExportRecord]) -> ExportResult<Vec<u8>> {
    let pages = layout(records);
    let page_count = pages.len();

    let (doc, first_page, first_layer) =
        PdfDocument::new(TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    for (index, rows) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };
        draw_page(&layer, rows, index + 1, page_count, records.len(), &regular, &bold);
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

fn draw_page(
    layer: &PdfLayerReference,
    rows: &[[String; 6]],
    page_number: usize,
    page_count: usize,
    total_records: usize,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    layer.use_text(TITLE, TITLE_SIZE, Mm(MARGIN), Mm(PAGE_HEIGHT - MARGIN), bold);
    layer.use_text(
        format!("{total_records} queries - page {page_number} of {page_count}"),
        BODY_SIZE,
        Mm(PAGE_WIDTH - MARGIN - 50.0),
        Mm(PAGE_HEIGHT - MARGIN),
        regular,
    );

    for (title, x, _) in COLUMNS {
        layer.use_text(title, HEADER_SIZE, Mm(x), Mm(TABLE_TOP), bold);
    }

    let mut y = TABLE_TOP - ROW_HEIGHT;
    for cells in rows {
        for (cell, (_, x, _)) in cells.iter().zip(COLUMNS) {
            layer.use_text(cell.as_str(), BODY_SIZE, Mm(x), Mm(y), regular);
        }
        y -= ROW_HEIGHT;
    }
}

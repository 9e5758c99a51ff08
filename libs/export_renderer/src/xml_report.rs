use std::borrow::Cow;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{ExportError, ExportResult};
use crate::models::{ExportRecord, date_text};

pub(crate) fn render(records: &[ExportRecord]) -> ExportResult<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(&mut writer, Event::Start(BytesStart::new("weather_queries")))?;

    for record in records {
        write(&mut writer, Event::Start(BytesStart::new("query")))?;
        element(&mut writer, "id", &record.id.to_string())?;
        element(&mut writer, "location_input", &record.location_input)?;
        element(&mut writer, "resolved_location", &record.resolved_location)?;
        element(&mut writer, "start_date", &date_text(record.start_date))?;
        element(&mut writer, "end_date", &date_text(record.end_date))?;
        element(&mut writer, "created_at", &record.created_at_text())?;
        element(&mut writer, "temperature", &record.temperature_text())?;
        element(&mut writer, "weather", record.weather_text())?;
        write(&mut writer, Event::End(BytesEnd::new("query")))?;
    }

    write(&mut writer, Event::End(BytesEnd::new("weather_queries")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> ExportResult<()> {
    if text.is_empty() {
        return write(writer, Event::Empty(BytesStart::new(name)));
    }
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(&xml_text(text))))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

/// Drops characters outside the XML 1.0 `Char` production, which escaping
/// cannot represent.
pub(crate) fn xml_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> ExportResult<()> {
    writer
        .write_event(event)
        .map_err(|e| ExportError::Xml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use uuid::Uuid;

    use crate::{ExportError, ExportFormat, ExportRecord, pdf_report, render, xml_report};

    fn record(id: u128, location: &str, temp: Option<f64>) -> ExportRecord {
        let current = match temp {
            Some(t) => json!({
                "main": { "temp": t },
                "weather": [{ "description": "light rain" }]
            }),
            None => json!({}),
        };
        ExportRecord {
            id: Uuid::from_u128(id),
            location_input: location.to_string(),
            resolved_location: format!("{location}, Somewhere"),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            end_date: None,
            weather_result: json!({ "current": current, "forecast": { "list": [] } }),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap(),
        }
    }

    fn records() -> Vec<ExportRecord> {
        vec![record(2, "Paris", Some(21.5)), record(1, "Oslo", None)]
    }

    #[test]
    fn format_parsing_and_headers() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(ExportError::UnknownFormat(f)) if f == "xlsx"
        ));

        let export = render(ExportFormat::Xml, &[]).unwrap();
        assert_eq!(export.content_type(), "application/xml");
        assert_eq!(
            export.content_disposition(),
            "attachment; filename=weather_queries.xml"
        );
    }

    #[test]
    fn derived_fields_come_from_current_conditions() {
        let records = records();
        assert_eq!(records[0].temperature(), Some(21.5));
        assert_eq!(records[0].weather(), Some("light rain"));
        assert_eq!(records[1].temperature(), None);
        assert_eq!(records[1].weather(), None);
    }

    #[test]
    fn json_export_is_the_full_record_list() {
        let export = render(ExportFormat::Json, &records()).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&export.bytes).unwrap();

        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], json!(Uuid::from_u128(2).to_string()));
        assert_eq!(items[0]["weather_result"]["current"]["main"]["temp"], json!(21.5));
        assert_eq!(items[1]["end_date"], serde_json::Value::Null);
        assert_eq!(items[1]["start_date"], json!("2025-06-01"));
    }

    #[test]
    fn csv_export_has_header_and_one_row_per_record() {
        let export = render(ExportFormat::Csv, &records()).unwrap();
        let text = String::from_utf8(export.bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "ID,Location Input,Resolved Location,Start Date,End Date,Created At,Temperature (°C),Weather"
        );
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            format!(
                "{},Paris,\"Paris, Somewhere\",2025-06-01,,2025-06-01T12:30:00Z,21.5,light rain",
                Uuid::from_u128(2)
            )
        );
        assert!(lines[2].ends_with(",N/A,N/A"), "{}", lines[2]);
    }

    #[test]
    fn xml_export_escapes_and_lists_every_record() {
        let mut records = records();
        records[1].location_input = "Tom & Jerry <town>".to_string();

        let export = render(ExportFormat::Xml, &records).unwrap();
        let text = String::from_utf8(export.bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert_eq!(text.matches("<query>").count(), 2);
        assert!(text.contains(&format!("<id>{}</id>", Uuid::from_u128(1))));
        assert!(text.contains("<location_input>Tom &amp; Jerry &lt;town&gt;</location_input>"));
        assert!(text.contains("<temperature>21.5</temperature>"));
        assert!(text.contains("<temperature>N/A</temperature>"));
        assert!(text.contains("<end_date/>"));
    }

    #[test]
    fn xml_export_drops_characters_xml_cannot_carry() {
        let mut records = records();
        records[0].location_input = "Paris\u{1}\u{1F}".to_string();
        records[1].resolved_location = "Oslo\u{FFFE}, Norway\tNO".to_string();

        let export = render(ExportFormat::Xml, &records).unwrap();
        let text = String::from_utf8(export.bytes).unwrap();

        assert!(!text.chars().any(|c| c.is_control() && c != '\n' && c != '\t' && c != '\r'));
        assert!(!text.contains('\u{FFFE}'));
        assert!(text.contains("<location_input>Paris</location_input>"));
        assert!(text.contains("<resolved_location>Oslo, Norway\tNO</resolved_location>"));

        assert_eq!(xml_report::xml_text("Lyon \u{E9}t\u{E9}"), "Lyon \u{E9}t\u{E9}");
        assert_eq!(xml_report::xml_text("a\u{0}b\u{8}c"), "abc");
    }

    #[test]
    fn text_exports_are_deterministic() {
        let records = records();
        for format in [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Xml] {
            let first = render(format, &records).unwrap();
            let second = render(format, &records).unwrap();
            assert_eq!(first.bytes, second.bytes, "{format} export changed");
        }
    }

    #[test]
    fn pdf_layout_truncates_and_paginates() {
        let per_page = pdf_report::rows_per_page();
        let mut many: Vec<ExportRecord> = (0..(per_page as u128 * 2 + 1))
            .map(|i| record(i, "Paris", Some(20.0)))
            .collect();
        many[0].resolved_location = "R".repeat(80);
        many[1].location_input = "Zürich".to_string();
        many[2].location_input = "Łódź".to_string();

        let pages = pdf_report::layout(&many);

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].len(), 1);
        assert_eq!(pages[0][0][2], "R".repeat(30));
        assert_eq!(pages[0][1][1], "Zürich");
        assert_eq!(pages[0][2][1], "?ód?");
        assert_eq!(pages[0][0][5], "2025-06-01 12:30");

        let ids: Vec<String> = pages.iter().flatten().map(|row| row[0].clone()).collect();
        let expected: Vec<String> = many.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn pdf_temperatures_carry_their_unit() {
        let pages = pdf_report::layout(&records());

        assert_eq!(pages[0][0][3], "21.5 °C");
        assert_eq!(pages[0][1][3], "N/A");
    }

    #[test]
    fn pdf_export_is_a_pdf_even_when_empty() {
        assert_eq!(pdf_report::layout(&[]).len(), 1);

        let export = render(ExportFormat::Pdf, &[]).unwrap();
        assert!(export.bytes.starts_with(b"%PDF"));

        let export = render(ExportFormat::Pdf, &records()).unwrap();
        assert_eq!(export.content_type(), "application/pdf");
        assert!(export.bytes.starts_with(b"%PDF"));
    }
}

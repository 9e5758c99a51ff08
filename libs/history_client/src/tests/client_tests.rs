#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::tests::{record_json, report_json};
    use crate::{CreateQueryRequest, HistoryClient, HistoryClientError, UpdateQueryRequest};

    const ID: &str = "01972a1e-8f00-7000-8000-000000000001";

    fn id() -> Uuid {
        Uuid::parse_str(ID).unwrap()
    }

    #[test]
    fn base_url_is_normalized() {
        let client = HistoryClient::new("http://localhost:8001").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8001/");

        let client = HistoryClient::new("http://example.com/weather//").unwrap();
        assert_eq!(client.base_url().as_str(), "http://example.com/weather/");

        assert!(matches!(
            HistoryClient::new("not a url"),
            Err(HistoryClientError::InvalidBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn live_weather_passes_location_as_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/weather/live"))
            .and(query_param("location", "Paris, France"))
            .respond_with(ResponseTemplate::new(200).set_body_json(report_json("Paris", 21.5)))
            .mount(&server)
            .await;

        let client = HistoryClient::new(&server.uri()).unwrap();
        let report = client.live_weather("Paris, France").await.unwrap();

        assert_eq!(report.location.display_name, "Paris");
        assert_eq!(report.current.main.temp, 21.5);
    }

    #[tokio::test]
    async fn create_sends_body_and_decodes_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/weather/query"))
            .and(body_json(json!({ "location_input": "Paris", "start_date": "2025-06-01" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(record_json(ID, "Paris", 21.5)))
            .expect(1)
            .mount(&server)
            .await;

        let client = HistoryClient::new(&server.uri()).unwrap();
        let request = CreateQueryRequest {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..CreateQueryRequest::new("Paris")
        };
        let record = client.create_query(&request).await.unwrap();

        assert_eq!(record.id, id());
        assert_eq!(record.resolved_location, "Paris, France");
        assert_eq!(record.end_date, None);
    }

    #[tokio::test]
    async fn update_sends_only_present_fields_and_nulls() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("/api/weather/query/{ID}")))
            .and(body_json(json!({ "location_input": "Lyon", "end_date": null })))
            .respond_with(ResponseTemplate::new(200).set_body_json(record_json(ID, "Lyon", 18.0)))
            .expect(1)
            .mount(&server)
            .await;

        let client = HistoryClient::new(&server.uri()).unwrap();
        let request = UpdateQueryRequest {
            location_input: Some("Lyon".to_string()),
            start_date: None,
            end_date: Some(None),
        };
        let record = client.update_query(id(), &request).await.unwrap();

        assert_eq!(record.location_input, "Lyon");
    }

    #[tokio::test]
    async fn error_detail_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/api/weather/query/{ID}")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "detail": "Weather query not found",
                "code": "not_found"
            })))
            .mount(&server)
            .await;

        let client = HistoryClient::new(&server.uri()).unwrap();
        let err = client.get_query(id()).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Weather query not found");
    }

    #[tokio::test]
    async fn error_without_detail_falls_back_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("/api/weather/query/{ID}")))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = HistoryClient::new(&server.uri()).unwrap();
        let err = client.delete_query(id()).await.unwrap_err();

        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "Request failed: Bad Gateway");
    }

    #[tokio::test]
    async fn delete_accepts_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("/api/weather/query/{ID}")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = HistoryClient::new(&server.uri()).unwrap();
        client.delete_query(id()).await.unwrap();
    }

    #[tokio::test]
    async fn list_and_export() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/weather/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                record_json(ID, "Paris", 21.5)
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/export/csv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/csv; charset=utf-8")
                    .insert_header(
                        "content-disposition",
                        "attachment; filename=weather_queries.csv",
                    )
                    .set_body_string("ID,Location Input\n"),
            )
            .mount(&server)
            .await;

        let client = HistoryClient::new(&server.uri()).unwrap();
        let records = client.list_queries().await.unwrap();
        assert_eq!(records.len(), 1);

        let file = client.export("csv").await.unwrap();
        assert_eq!(file.file_name.as_deref(), Some("weather_queries.csv"));
        assert_eq!(file.content_type.as_deref(), Some("text/csv; charset=utf-8"));
        assert_eq!(&file.bytes[..], b"ID,Location Input\n");
    }
}

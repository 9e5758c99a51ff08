#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::tests::report_json;
    use crate::{HistoryClient, SearchOutcome, SearchSequencer, SearchSession};

    #[test]
    fn only_the_latest_ticket_is_current() {
        let sequencer = SearchSequencer::new();
        let first = sequencer.issue();
        assert!(sequencer.is_current(first));

        let second = sequencer.issue();
        assert!(second > first);
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
    }

    async fn mount_live(server: &MockServer, location: &str, temp: f64, delay: Duration) {
        Mock::given(method("GET"))
            .and(path("/api/weather/live"))
            .and(query_param("location", location))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(report_json(location, temp))
                    .set_delay(delay),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn slow_older_response_is_discarded() {
        let server = MockServer::start().await;
        mount_live(&server, "Paris", 21.5, Duration::from_millis(400)).await;
        mount_live(&server, "Oslo", 9.0, Duration::ZERO).await;

        let session = SearchSession::new(Arc::new(HistoryClient::new(&server.uri()).unwrap()));
        let (older, newer) = tokio::join!(session.search("Paris"), session.search("Oslo"));

        assert_eq!(older.unwrap(), SearchOutcome::Superseded);
        assert!(matches!(newer.unwrap(), SearchOutcome::Applied(ref r) if r.location.display_name == "Oslo"));
        assert_eq!(session.current().unwrap().location.display_name, "Oslo");
    }

    #[tokio::test]
    async fn failed_search_keeps_previous_report() {
        let server = MockServer::start().await;
        mount_live(&server, "Paris", 21.5, Duration::ZERO).await;
        Mock::given(method("GET"))
            .and(path("/api/weather/live"))
            .and(query_param("location", "Atlantis"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "detail": "Location not found" })),
            )
            .mount(&server)
            .await;

        let session = SearchSession::new(Arc::new(HistoryClient::new(&server.uri()).unwrap()));
        session.search("Paris").await.unwrap();

        let err = session.search("Atlantis").await.unwrap_err();
        assert_eq!(err.to_string(), "Location not found");
        assert_eq!(session.current().unwrap().current.main.temp, 21.5);
    }
}

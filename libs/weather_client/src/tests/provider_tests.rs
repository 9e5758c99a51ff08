#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::{OpenWeatherProvider, ProviderConfig, WeatherClientError, WeatherProvider};

    fn current_body() -> serde_json::Value {
        json!({
            "name": "Paris",
            "dt": 1_748_779_200,
            "timezone": 7200,
            "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
            "main": {
                "temp": 21.5, "feels_like": 21.0, "temp_min": 19.0,
                "temp_max": 23.0, "humidity": 40, "pressure": 1015
            },
            "wind": { "speed": 3.1, "deg": 220 },
            "sys": { "country": "FR", "sunrise": 1_748_749_000, "sunset": 1_748_806_000 },
            "clouds": { "all": 0 },
            "visibility": 10000
        })
    }

    fn forecast_body() -> serde_json::Value {
        json!({
            "city": { "name": "Paris", "country": "FR", "timezone": 7200 },
            "list": [
                {
                    "dt": 1_748_790_000,
                    "weather": [{ "id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d" }],
                    "main": { "temp": 22.0, "temp_min": 21.0, "temp_max": 22.5, "humidity": 38 },
                    "dt_txt": "2025-06-01 15:00:00"
                }
            ]
        })
    }

    async fn mount_weather(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(server)
            .await;
    }

    fn provider_for(server: &MockServer, timeout: Duration) -> OpenWeatherProvider {
        let mut config = ProviderConfig::new("test-key");
        config.openweather_base_url = server.uri();
        config.nominatim_base_url = format!("{}/", server.uri());
        config.timeout = timeout;
        OpenWeatherProvider::new(config).expect("provider")
    }

    #[tokio::test]
    async fn lookup_by_name_resolves_and_fetches_both_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Paris"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "lat": "48.8566", "lon": "2.3522", "display_name": "Paris, Ile-de-France, France" }
            ])))
            .expect(1)
            .mount(&server)
            .await;
        mount_weather(&server).await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let report = provider.lookup("  Paris ").await.expect("lookup");

        assert_eq!(report.location.display_name, "Paris, Ile-de-France, France");
        assert_eq!(report.location.lat, 48.8566);
        assert_eq!(report.current.main.temp, 21.5);
        assert_eq!(report.current.summary(), Some("clear sky"));
        assert_eq!(report.forecast.list.len(), 1);
        assert_eq!(
            report.forecast.city.as_ref().map(|c| c.country.as_str()),
            Some("FR")
        );
    }

    #[tokio::test]
    async fn coordinates_use_reverse_geocoding_for_the_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("lat", "48.8566"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "display_name": "Hotel de Ville, Paris, France" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let location = provider.resolve("48.8566,2.3522").await.expect("resolve");

        assert_eq!(location.display_name, "Hotel de Ville, Paris, France");
        assert_eq!(location.lon, 2.3522);
    }

    #[tokio::test]
    async fn coordinates_without_a_reverse_match_are_labelled_by_value() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "error": "Unable to geocode" })),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let location = provider.resolve("0, -160").await.expect("resolve");

        assert_eq!(location.display_name, "0.0000, -160.0000");
    }

    #[tokio::test]
    async fn unknown_place_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let err = provider.lookup("Nowhereville").await.unwrap_err();

        assert!(matches!(err, WeatherClientError::LocationNotFound(ref q) if q == "Nowhereville"));
        assert!(!err.is_upstream());
    }

    #[tokio::test]
    async fn blank_input_never_reaches_upstream() {
        let server = MockServer::start().await;
        let provider = provider_for(&server, Duration::from_secs(5));

        let err = provider.lookup("   ").await.unwrap_err();

        assert!(matches!(err, WeatherClientError::EmptyLocation));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn provider_error_status_is_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "lat": "51.5", "lon": "-0.12", "display_name": "London" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_string("{\"message\":\"Invalid API key\"}"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let err = provider.lookup("London").await.unwrap_err();

        assert!(matches!(err, WeatherClientError::Upstream { .. }), "{err:?}");
        assert!(err.is_upstream());
        assert!(!err.to_string().contains("Invalid API key"));
    }

    #[tokio::test]
    async fn unparseable_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let err = provider.resolve("Berlin").await.unwrap_err();

        assert!(matches!(err, WeatherClientError::InvalidResponse { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_millis(200));
        let err = provider.resolve("Madrid").await.unwrap_err();

        assert!(matches!(err, WeatherClientError::Timeout { service: "geocoder" }), "{err:?}");
    }

    #[tokio::test]
    async fn forecast_only_skips_current_conditions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let location = crate::ResolvedLocation {
            lat: 48.8566,
            lon: 2.3522,
            display_name: "Paris".to_string(),
        };
        let forecast = provider.forecast_for(&location).await.expect("forecast");

        assert_eq!(forecast.list[0].dt_txt.as_deref(), Some("2025-06-01 15:00:00"));
    }
}

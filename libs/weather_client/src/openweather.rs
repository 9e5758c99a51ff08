use reqwest::Client;

use crate::error::WeatherClientResult;
use crate::location::Coordinates;
use crate::models::{CurrentConditions, Forecast};
use crate::transport::fetch_json;

const SERVICE: &str = "weather provider";

/// OpenWeather 2.5 REST API, metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn current(&self, coords: Coordinates) -> WeatherClientResult<CurrentConditions> {
        fetch_json(SERVICE, self.request("weather", coords)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn forecast(&self, coords: Coordinates) -> WeatherClientResult<Forecast> {
        fetch_json(SERVICE, self.request("forecast", coords)).await
    }

    fn request(&self, endpoint: &str, coords: Coordinates) -> reqwest::RequestBuilder {
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();
        self.http
            .get(format!("{}/{endpoint}", self.base_url))
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
    }
}

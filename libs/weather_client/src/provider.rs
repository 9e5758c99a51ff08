use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{WeatherClientError, WeatherClientResult};
use crate::geocode::NominatimGeocoder;
use crate::location::LocationInput;
use crate::models::{Forecast, ResolvedLocation, WeatherReport};
use crate::openweather::OpenWeatherClient;

pub const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("weather-history/", env!("CARGO_PKG_VERSION"));

/// Source of resolved locations and live weather.
#[async_trait]
pub trait WeatherProvider: Send + Sync + std::fmt::Debug {
    /// Resolves free-form input (name, postal code or `"lat,lon"`).
    async fn resolve(&self, input: &str) -> WeatherClientResult<ResolvedLocation>;

    /// Current conditions and forecast for an already resolved location.
    async fn report_for(&self, location: ResolvedLocation) -> WeatherClientResult<WeatherReport>;

    async fn forecast_for(&self, location: &ResolvedLocation) -> WeatherClientResult<Forecast>;

    async fn lookup(&self, input: &str) -> WeatherClientResult<WeatherReport> {
        let location = self.resolve(input).await?;
        self.report_for(location).await
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub openweather_base_url: String,
    pub nominatim_base_url: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            openweather_base_url: DEFAULT_OPENWEATHER_BASE_URL.to_string(),
            nominatim_base_url: DEFAULT_NOMINATIM_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Nominatim for locations, OpenWeather for conditions.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    geocoder: NominatimGeocoder,
    weather: OpenWeatherClient,
}

impl OpenWeatherProvider {
    pub fn new(config: ProviderConfig) -> WeatherClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(WeatherClientError::Client)?;

        Ok(Self {
            geocoder: NominatimGeocoder::new(http.clone(), config.nominatim_base_url),
            weather: OpenWeatherClient::new(
                http,
                config.openweather_base_url,
                config.api_key,
            ),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn resolve(&self, input: &str) -> WeatherClientResult<ResolvedLocation> {
        match LocationInput::parse(input)? {
            LocationInput::Coordinates(coords) => {
                let display_name = self
                    .geocoder
                    .reverse(coords)
                    .await?
                    .unwrap_or_else(|| coords.label());
                Ok(ResolvedLocation {
                    lat: coords.lat,
                    lon: coords.lon,
                    display_name,
                })
            }
            LocationInput::Search(query) => self.geocoder.search(query).await,
        }
    }

    async fn report_for(&self, location: ResolvedLocation) -> WeatherClientResult<WeatherReport> {
        let coords = location_coordinates(&location)?;
        let (current, forecast) =
            tokio::try_join!(self.weather.current(coords), self.weather.forecast(coords))?;

        tracing::debug!(
            location = %location.display_name,
            temp = current.main.temp,
            conditions = current.summary().unwrap_or("unknown"),
            forecast_points = forecast.list.len(),
            "weather report fetched"
        );

        Ok(WeatherReport {
            location,
            current,
            forecast,
        })
    }

    async fn forecast_for(&self, location: &ResolvedLocation) -> WeatherClientResult<Forecast> {
        let coords = location_coordinates(location)?;
        self.weather.forecast(coords).await
    }
}

fn location_coordinates(
    location: &ResolvedLocation,
) -> WeatherClientResult<crate::location::Coordinates> {
    crate::location::Coordinates::new(location.lat, location.lon).ok_or_else(|| {
        WeatherClientError::InvalidResponse {
            service: "geocoder",
            message: format!(
                "coordinates out of range: {}, {}",
                location.lat, location.lon
            ),
        }
    })
}

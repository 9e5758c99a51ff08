//! Forward and reverse geocoding against a Nominatim instance.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{WeatherClientError, WeatherClientResult};
use crate::location::Coordinates;
use crate::models::ResolvedLocation;
use crate::transport::fetch_json;

const SERVICE: &str = "geocoder";

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseHit {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// First match for a free-form query, or `LocationNotFound`.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> WeatherClientResult<ResolvedLocation> {
        let request = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("format", "json"), ("limit", "1")]);

        let hits: Vec<SearchHit> = fetch_json(SERVICE, request).await?;
        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| WeatherClientError::LocationNotFound(query.to_string()))?;

        let invalid = |field: &str| WeatherClientError::InvalidResponse {
            service: SERVICE,
            message: format!("non-numeric {field} in search result"),
        };
        let lat = hit.lat.parse::<f64>().map_err(|_| invalid("lat"))?;
        let lon = hit.lon.parse::<f64>().map_err(|_| invalid("lon"))?;

        Ok(ResolvedLocation {
            lat,
            lon,
            display_name: hit.display_name,
        })
    }

    /// Display name for a coordinate pair, if Nominatim has one.
    #[tracing::instrument(skip(self))]
    pub async fn reverse(&self, coords: Coordinates) -> WeatherClientResult<Option<String>> {
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();
        let request = self
            .http
            .get(format!("{}/reverse", self.base_url))
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("format", "json")]);

        let hit: ReverseHit = fetch_json(SERVICE, request).await?;
        Ok(hit.display_name.filter(|name| !name.trim().is_empty()))
    }
}

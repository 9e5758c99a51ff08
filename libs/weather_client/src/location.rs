use crate::error::{WeatherClientError, WeatherClientResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }

    /// Display name used when reverse geocoding has nothing better.
    pub fn label(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// What the user typed, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput<'a> {
    Coordinates(Coordinates),
    Search(&'a str),
}

impl<'a> LocationInput<'a> {
    pub fn parse(raw: &'a str) -> WeatherClientResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WeatherClientError::EmptyLocation);
        }

        Ok(parse_coordinates(trimmed)
            .map(LocationInput::Coordinates)
            .unwrap_or(LocationInput::Search(trimmed)))
    }
}

/// Accepts exactly `"<lat>,<lon>"` with optional whitespace around each part.
pub fn parse_coordinates(raw: &str) -> Option<Coordinates> {
    let (lat, lon) = raw.split_once(',')?;
    if lon.contains(',') {
        return None;
    }
    let lat = lat.trim().parse::<f64>().ok()?;
    let lon = lon.trim().parse::<f64>().ok()?;
    Coordinates::new(lat, lon)
}

/// Lowercased, whitespace-collapsed form of an input, used as a cache key.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

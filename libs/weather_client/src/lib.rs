//! Resolves free-form location input to coordinates and fetches current
//! conditions plus a multi-day forecast for them.

pub mod error;
pub mod geocode;
pub mod location;
pub mod models;
pub mod openweather;
pub mod provider;
mod transport;

#[cfg(test)]
mod tests;

pub use error::{WeatherClientError, WeatherClientResult};
pub use models::{
    CurrentConditions, Forecast, ForecastPoint, ResolvedLocation, WeatherReport,
};
pub use location::{Coordinates, LocationInput};
pub use provider::{OpenWeatherProvider, ProviderConfig, WeatherProvider};

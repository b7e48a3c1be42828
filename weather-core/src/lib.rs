//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Geocoding of place names (Nominatim)
//! - Current conditions and today's hourly wind (Open-Meteo)
//! - Placeholder values for readings the API leaves out
//! - The request handler that ties these together and maps failures to status codes
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod geocode;
pub mod handler;
pub mod model;
pub mod placeholder;
pub mod provider;

pub use config::Config;
pub use error::{ForecastError, GeocodeError};
pub use geocode::{Geocoder, NominatimGeocoder, Resolution};
pub use handler::WeatherHandler;
pub use model::{
    Coordinates, CurrentWeather, HandlerResponse, HourlyWeatherPoint, ResponseBody, WeatherQuery,
    WeatherReport,
};
pub use placeholder::{PlaceholderMode, PlaceholderSource};
pub use provider::{ForecastProvider, openmeteo::OpenMeteoProvider};

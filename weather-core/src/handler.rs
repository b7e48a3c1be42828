//! The request handler: validate, geocode, fetch current, fetch hourly, assemble.
//!
//! Every stage is awaited before the next one starts, and the first failing
//! stage decides the response. No stage is retried.

use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    Config,
    geocode::{Geocoder, NominatimGeocoder, Resolution, resolve},
    model::{HandlerResponse, WeatherQuery, WeatherReport},
    provider::{ForecastProvider, provider_from_config},
};

pub const MISSING_PARAMETERS: &str = "Please provide both 'city' and 'hour' parameters.";
pub const INVALID_HOUR: &str = "The 'hour' parameter must be a non-negative integer.";
pub const CITY_NOT_FOUND: &str = "City not found.";
pub const GEOCODER_UNAVAILABLE: &str = "Geocoding service unavailable.";
pub const CURRENT_WEATHER_FAILED: &str = "Error fetching current weather data.";
pub const HOURLY_WEATHER_FAILED: &str = "Error fetching hourly weather data.";

#[derive(Debug, Clone)]
pub struct WeatherHandler {
    geocoder: Arc<dyn Geocoder>,
    forecast: Arc<dyn ForecastProvider>,
    report_geocoder_outage: bool,
}

impl WeatherHandler {
    pub fn new(geocoder: Arc<dyn Geocoder>, forecast: Arc<dyn ForecastProvider>) -> Self {
        Self { geocoder, forecast, report_geocoder_outage: false }
    }

    /// When enabled, a failing geocoding service yields 503 rather than 404.
    pub fn report_geocoder_outage(mut self, enabled: bool) -> Self {
        self.report_geocoder_outage = enabled;
        self
    }

    /// Wire the Nominatim geocoder and Open-Meteo provider from `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let geocoder = Arc::new(NominatimGeocoder::new(&config.geocoder)?);
        let forecast = provider_from_config(config)?;

        Ok(Self::new(geocoder, forecast)
            .report_geocoder_outage(config.handler.report_geocoder_outage))
    }

    pub async fn handle(&self, query: &WeatherQuery) -> HandlerResponse {
        let response = self.run(query).await;
        info!(
            city = query.city.as_deref().unwrap_or_default(),
            hour = query.hour.as_deref().unwrap_or_default(),
            status = response.status_code,
            "Handled weather request"
        );
        response
    }

    async fn run(&self, query: &WeatherQuery) -> HandlerResponse {
        let (Some(city), Some(hour)) = (query.city.as_deref(), query.hour.as_deref()) else {
            return HandlerResponse::message(400, MISSING_PARAMETERS);
        };

        let Some(end_hour) = parse_hour(hour) else {
            return HandlerResponse::message(400, INVALID_HOUR);
        };

        let coords = match resolve(self.geocoder.as_ref(), city).await {
            Resolution::Found(coords) => coords,
            Resolution::ServiceError(_) if self.report_geocoder_outage => {
                return HandlerResponse::message(503, GEOCODER_UNAVAILABLE);
            }
            Resolution::NotFound | Resolution::ServiceError(_) => {
                return HandlerResponse::message(404, CITY_NOT_FOUND);
            }
        };

        let current_weather = match self.forecast.current(coords).await {
            Ok(current) => current,
            Err(err) => {
                warn!(error = %err, "Error fetching weather data");
                return HandlerResponse::message(500, CURRENT_WEATHER_FAILED);
            }
        };

        let today = Local::now().date_naive();
        let hourly_weather = match self.forecast.hourly(coords, end_hour, today).await {
            Ok(points) => points,
            Err(err) => {
                warn!(error = %err, "Error fetching hourly weather data");
                return HandlerResponse::message(500, HOURLY_WEATHER_FAILED);
            }
        };

        HandlerResponse::ok(WeatherReport { current_weather, hourly_weather })
    }
}

/// Any non-negative integer is accepted. Values past `u32::MAX` saturate, since
/// the series length caps the result anyway.
fn parse_hour(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().unwrap_or(u32::MAX))
}

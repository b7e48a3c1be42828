use anyhow::Context;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    config::ForecastConfig,
    error::{ForecastError, truncate_body},
    model::{Coordinates, CurrentWeather, HourlyWeatherPoint},
    placeholder::{HOURLY_WIND_SPEED, HUMIDITY, PRESSURE, PlaceholderSource, WIND_DIRECTION},
};

use super::ForecastProvider;

const HOURLY_FIELDS: &str = "windspeed_10m,winddirection_10m";

/// Client for the keyless Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
    placeholders: Arc<dyn PlaceholderSource>,
}

impl OpenMeteoProvider {
    pub fn new(
        config: &ForecastConfig,
        placeholders: Arc<dyn PlaceholderSource>,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build forecast HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            placeholders,
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        what: &'static str,
        params: &[(&str, String)],
    ) -> Result<T, ForecastError> {
        let url = format!("{}/forecast", self.base_url);
        debug!(%url, ?params, "Fetching {what} weather");

        let res = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|source| ForecastError::Request { what, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| ForecastError::Request { what, source })?;

        if !status.is_success() {
            return Err(ForecastError::Status { what, status, body: truncate_body(&body) });
        }

        serde_json::from_str(&body).map_err(|source| ForecastError::Parse { what, source })
    }
}

#[derive(Debug, Default, Deserialize)]
struct OmCurrentResponse {
    current_weather: Option<OmCurrentWeather>,
}

#[derive(Debug, Default, Deserialize)]
struct OmCurrentWeather {
    temperature: Option<f64>,
    windspeed: Option<f64>,
    winddirection: Option<f64>,
    relative_humidity: Option<f64>,
    pressure_msl: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OmHourlyResponse {
    hourly: Option<OmHourly>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmHourly {
    time: Vec<String>,
    windspeed_10m: Vec<Option<f64>>,
    winddirection_10m: Vec<Option<f64>>,
}

fn current_from_payload(
    payload: OmCurrentResponse,
    date: String,
    placeholders: &dyn PlaceholderSource,
) -> CurrentWeather {
    let current = payload.current_weather.unwrap_or_default();

    CurrentWeather {
        date,
        temperature: current.temperature,
        wind_speed: current.windspeed,
        wind_direction: current.winddirection,
        humidity: current.relative_humidity.unwrap_or_else(|| placeholders.sample(&HUMIDITY)),
        pressure: current.pressure_msl.unwrap_or_else(|| placeholders.sample(&PRESSURE)),
    }
}

fn hourly_from_payload(
    payload: OmHourlyResponse,
    end_hour: u32,
    placeholders: &dyn PlaceholderSource,
) -> Vec<HourlyWeatherPoint> {
    let hourly = payload.hourly.unwrap_or_default();
    let wanted = usize::try_from(end_hour).unwrap_or(usize::MAX).saturating_add(1);

    hourly
        .time
        .into_iter()
        .take(wanted)
        .enumerate()
        .map(|(i, time)| HourlyWeatherPoint {
            time,
            wind_speed: hourly
                .windspeed_10m
                .get(i)
                .copied()
                .flatten()
                .unwrap_or_else(|| placeholders.sample(&HOURLY_WIND_SPEED)),
            wind_direction: hourly
                .winddirection_10m
                .get(i)
                .copied()
                .flatten()
                .unwrap_or_else(|| placeholders.sample(&WIND_DIRECTION)),
        })
        .collect()
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    #[instrument(skip(self), fields(lat = at.latitude, lon = at.longitude))]
    async fn current(&self, at: Coordinates) -> Result<CurrentWeather, ForecastError> {
        let params = [
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("current_weather", "true".to_string()),
            ("timezone", "auto".to_string()),
        ];

        let payload: OmCurrentResponse = self.fetch("current", &params).await?;
        let date = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        Ok(current_from_payload(payload, date, self.placeholders.as_ref()))
    }

    #[instrument(skip(self), fields(lat = at.latitude, lon = at.longitude))]
    async fn hourly(
        &self,
        at: Coordinates,
        end_hour: u32,
        day: NaiveDate,
    ) -> Result<Vec<HourlyWeatherPoint>, ForecastError> {
        let day = day.format("%Y-%m-%d").to_string();
        let params = [
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
            ("start_date", day.clone()),
            ("end_date", day),
        ];

        let payload: OmHourlyResponse = self.fetch("hourly", &params).await?;

        Ok(hourly_from_payload(payload, end_hour, self.placeholders.as_ref()))
    }
}

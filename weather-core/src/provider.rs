use crate::{
    Config,
    error::ForecastError,
    model::{Coordinates, CurrentWeather, HourlyWeatherPoint},
    provider::openmeteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::{fmt::Debug, sync::Arc};

pub mod openmeteo;

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Conditions right now at `at`.
    async fn current(&self, at: Coordinates) -> Result<CurrentWeather, ForecastError>;

    /// Hourly wind for `day`, slots `0..=end_hour`, capped by what the API returns.
    async fn hourly(
        &self,
        at: Coordinates,
        end_hour: u32,
        day: NaiveDate,
    ) -> Result<Vec<HourlyWeatherPoint>, ForecastError>;
}

/// Construct the forecast provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn ForecastProvider>> {
    let placeholders = Arc::from(config.placeholders.source());
    let provider = OpenMeteoProvider::new(&config.forecast, placeholders)?;
    Ok(Arc::new(provider))
}

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Select, Text};
use std::{fmt::Write as _, path::PathBuf};
use weather_core::{
    Config, HandlerResponse, PlaceholderMode, WeatherHandler, WeatherQuery, WeatherReport,
};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather and today's hourly wind for a city")]
pub struct Cli {
    /// Read configuration from this file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively edit service URLs, placeholder mode and server settings.
    Configure,

    /// Look up one city and print the result.
    Show {
        /// City or place name.
        city: String,

        /// Last hour (0-based) of today's hourly wind series to include.
        hour: String,

        /// Print the raw `{"statusCode", "body"}` envelope instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Serve `GET /weather?city=..&hour=..` over HTTP.
    Serve {
        /// Listen address; overrides `server.bind` from the config file.
        #[arg(long)]
        bind: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;

        match self.command {
            Command::Configure => {
                let config = configure(config)?;
                let path = match &self.config {
                    Some(path) => {
                        config.save_to(path)?;
                        path.clone()
                    }
                    None => config.save()?,
                };
                println!("Configuration saved to {}", path.display());
            }
            Command::Show { city, hour, json } => {
                let handler = WeatherHandler::from_config(&config)?;
                let response = handler.handle(&WeatherQuery::new(city.as_str(), hour)).await;

                if json {
                    let out = serde_json::to_string_pretty(&response)
                        .context("Failed to serialize response")?;
                    println!("{out}");
                } else if let Some(report) = response.report() {
                    print!("{}", render_report(&city, report));
                }

                ensure_success(&response)?;
            }
            Command::Serve { bind } => {
                let bind = bind.unwrap_or_else(|| config.server.bind.clone());
                let handler = WeatherHandler::from_config(&config)?;
                server::run(handler, &bind).await?;
            }
        }

        Ok(())
    }

    fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }
}

fn configure(mut cfg: Config) -> Result<Config> {
    cfg.geocoder.base_url = ask_text("Geocoding service URL:", &cfg.geocoder.base_url)?;
    cfg.geocoder.user_agent =
        ask_text("User-Agent sent to the geocoder:", &cfg.geocoder.user_agent)?;
    cfg.forecast.base_url = ask_text("Forecast API URL:", &cfg.forecast.base_url)?;

    let modes = PlaceholderMode::all().to_vec();
    let cursor = modes.iter().position(|m| *m == cfg.placeholders).unwrap_or(0);
    cfg.placeholders = Select::new("Placeholder values for missing readings:", modes)
        .with_starting_cursor(cursor)
        .prompt()?;

    cfg.handler.report_geocoder_outage =
        Confirm::new("Answer 503 instead of 404 when the geocoding service is down?")
            .with_default(cfg.handler.report_geocoder_outage)
            .prompt()?;

    cfg.server.bind = ask_text("Listen address for `weather serve`:", &cfg.server.bind)?;

    Ok(cfg)
}

fn ask_text(message: &str, current: &str) -> Result<String> {
    let answer = Text::new(message).with_default(current).prompt()?;
    Ok(answer.trim().to_string())
}

fn ensure_success(response: &HandlerResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }

    bail!(
        "Request failed with status {}: {}",
        response.status_code,
        response.error_message().unwrap_or("unknown error")
    )
}

fn reading(value: Option<f64>) -> String {
    value.map_or_else(|| weather_core::model::NOT_AVAILABLE.to_string(), |v| v.to_string())
}

fn render_report(city: &str, report: &WeatherReport) -> String {
    let cw = &report.current_weather;
    let mut out = String::new();

    let _ = writeln!(out, "Weather for {city} at {}", cw.date);
    let _ = writeln!(out, "  Temperature:    {} °C", reading(cw.temperature));
    let _ = writeln!(
        out,
        "  Wind:           {} km/h from {}°",
        reading(cw.wind_speed),
        reading(cw.wind_direction)
    );
    let _ = writeln!(out, "  Humidity:       {} %", cw.humidity);
    let _ = writeln!(out, "  Pressure:       {} hPa", cw.pressure);

    if report.hourly_weather.is_empty() {
        let _ = writeln!(out, "No hourly wind data for today.");
    } else {
        let _ = writeln!(out, "Hourly wind (10 m):");
        for point in &report.hourly_weather {
            let _ = writeln!(
                out,
                "  {:<17} {:>6.1} km/h  {:>5.0}°",
                point.time, point.wind_speed, point.wind_direction
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::{CurrentWeather, HourlyWeatherPoint};

    fn report(hours: usize) -> WeatherReport {
        WeatherReport {
            current_weather: CurrentWeather {
                date: "2024-05-01 12:00:00".to_string(),
                temperature: Some(17.4),
                wind_speed: None,
                wind_direction: Some(245.0),
                humidity: 60.0,
                pressure: 1015.0,
            },
            hourly_weather: (0..hours)
                .map(|h| HourlyWeatherPoint {
                    time: format!("2024-05-01T{h:02}:00"),
                    wind_speed: 4.25,
                    wind_direction: 180.0,
                })
                .collect(),
        }
    }

    #[test]
    fn show_parses_city_and_hour() {
        let cli = Cli::parse_from(["weather", "show", "New York", "5", "--json"]);
        match cli.command {
            Command::Show { city, hour, json } => {
                assert_eq!(city, "New York");
                assert_eq!(hour, "5");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli =
            Cli::parse_from(["weather", "serve", "--bind", "0.0.0.0:9000", "--config", "x.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Command::Serve { bind: Some(ref b) } if b == "0.0.0.0:9000"));
    }

    #[test]
    fn render_marks_missing_readings() {
        let text = render_report("Berlin", &report(2));

        assert!(text.starts_with("Weather for Berlin at 2024-05-01 12:00:00"));
        assert!(text.contains("Temperature:    17.4 °C"));
        assert!(text.contains("N/A km/h from 245°"));
        assert!(text.contains("2024-05-01T01:00"));
        assert!(text.contains("4.2 km/h") || text.contains("4.3 km/h"));
    }

    #[test]
    fn render_without_hourly_points() {
        let text = render_report("Berlin", &report(0));
        assert!(text.contains("No hourly wind data for today."));
    }

    #[test]
    fn non_success_response_is_an_error() {
        let err = ensure_success(&HandlerResponse::message(404, "City not found.")).unwrap_err();
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("City not found."));

        assert!(ensure_success(&HandlerResponse::ok(report(1))).is_ok());
    }
}

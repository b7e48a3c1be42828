//! HTTP front end for the weather handler.

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use weather_core::{ResponseBody, WeatherHandler, WeatherQuery};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    version: &'static str,
}

pub fn router(handler: WeatherHandler) -> Router {
    Router::new()
        .route("/weather", get(weather))
        .route("/health", get(health))
        .with_state(handler)
        .layer(TraceLayer::new_for_http())
}

async fn weather(
    State(handler): State<WeatherHandler>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected weather query string");
            let error = rejection.body_text();
            return (rejection.status(), Json(ErrorBody { error })).into_response();
        }
    };

    let response = handler.handle(&query).await;
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match response.body {
        ResponseBody::Report(report) => (status, Json(report)).into_response(),
        ResponseBody::Message(error) => (status, Json(ErrorBody { error })).into_response(),
    }
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

pub async fn run(handler: WeatherHandler, bind: &str) -> anyhow::Result<()> {
    let listener =
        TcpListener::bind(bind).await.with_context(|| format!("Failed to bind to {bind}"))?;
    let addr = listener.local_addr().context("Failed to read listener address")?;
    info!("Serving weather lookups at http://{addr}/weather");

    axum::serve(listener, router(handler))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated with an error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use chrono::NaiveDate;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;
    use weather_core::{
        Coordinates, CurrentWeather, ForecastError, ForecastProvider, GeocodeError, Geocoder,
        HourlyWeatherPoint,
    };

    #[derive(Debug)]
    struct KnownCities;

    #[async_trait]
    impl Geocoder for KnownCities {
        async fn lookup(&self, place: &str) -> Result<Option<Coordinates>, GeocodeError> {
            Ok((place == "Lisbon").then(|| Coordinates::new(38.72, -9.14)))
        }
    }

    #[derive(Debug)]
    struct CalmDay;

    #[async_trait]
    impl ForecastProvider for CalmDay {
        async fn current(&self, _at: Coordinates) -> Result<CurrentWeather, ForecastError> {
            Ok(CurrentWeather {
                date: "2024-05-01 09:30:00".to_string(),
                temperature: Some(21.0),
                wind_speed: Some(2.0),
                wind_direction: None,
                humidity: 45.0,
                pressure: 1020.0,
            })
        }

        async fn hourly(
            &self,
            _at: Coordinates,
            end_hour: u32,
            _day: NaiveDate,
        ) -> Result<Vec<HourlyWeatherPoint>, ForecastError> {
            Ok((0..=end_hour.min(23))
                .map(|h| HourlyWeatherPoint {
                    time: format!("2024-05-01T{h:02}:00"),
                    wind_speed: 1.0,
                    wind_direction: 10.0,
                })
                .collect())
        }
    }

    fn app() -> Router {
        router(WeatherHandler::new(Arc::new(KnownCities), Arc::new(CalmDay)))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let resp = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn weather_success() {
        let (status, body) = get_json("/weather?city=Lisbon&hour=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hourly_weather"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["current_weather"]["temperature"], 21.0);
        assert_eq!(body["current_weather"]["wind_direction"], "N/A");
    }

    #[tokio::test]
    async fn weather_missing_parameter() {
        let (status, body) = get_json("/weather?city=Lisbon").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please provide both 'city' and 'hour' parameters.");
    }

    #[tokio::test]
    async fn weather_unknown_city() {
        let (status, body) = get_json("/weather?city=Atlantis&hour=4").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "City not found.");
    }

    #[tokio::test]
    async fn weather_bad_hour() {
        let (status, _) = get_json("/weather?city=Lisbon&hour=noon").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_query_gets_json_error() {
        let (status, body) = get_json("/weather?city=Lisbon&hour=1&hour=2").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{body}");
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (status, body) = get_json("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}

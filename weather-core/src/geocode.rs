//! Place name to coordinates, via a Nominatim-compatible `/search` endpoint.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, instrument, warn};

use crate::{
    config::GeocoderConfig,
    error::{GeocodeError, truncate_body},
    model::Coordinates,
};

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// `Ok(None)` means the service answered but had no match.
    async fn lookup(&self, place: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Outcome of resolving a place name, keeping "no match" apart from
/// "service failed" so callers can choose how much of that to expose.
#[derive(Debug)]
pub enum Resolution {
    Found(Coordinates),
    NotFound,
    ServiceError(GeocodeError),
}

/// Resolve `place`, logging any failure. Never returns an error.
pub async fn resolve(geocoder: &dyn Geocoder, place: &str) -> Resolution {
    match geocoder.lookup(place).await {
        Ok(Some(coords)) => {
            debug!(%place, lat = coords.latitude, lon = coords.longitude, "Geocoded place");
            Resolution::Found(coords)
        }
        Ok(None) => {
            warn!(%place, "City not found");
            Resolution::NotFound
        }
        Err(err) => {
            warn!(%place, error = %err, "Error fetching coordinates");
            Resolution::ServiceError(err)
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build geocoding HTTP client")?;

        Ok(Self { base_url: config.base_url.trim_end_matches('/').to_string(), http })
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn lookup(&self, place: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        debug!(%url, "Geocoding");

        let res = self
            .http
            .get(&url)
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(GeocodeError::Request)?;

        let status = res.status();
        let body = res.text().await.map_err(GeocodeError::Request)?;

        if !status.is_success() {
            return Err(GeocodeError::Status { status, body: truncate_body(&body) });
        }

        let places: Vec<NominatimPlace> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Parse(e.to_string()))?;

        let Some(first) = places.first() else {
            return Ok(None);
        };

        let latitude: f64 = first
            .lat
            .trim()
            .parse()
            .map_err(|_| GeocodeError::Parse(format!("Invalid latitude '{}'", first.lat)))?;
        let longitude: f64 = first
            .lon
            .trim()
            .parse()
            .map_err(|_| GeocodeError::Parse(format!("Invalid longitude '{}'", first.lon)))?;

        Ok(Some(Coordinates::new(latitude, longitude)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum Canned {
        Hit(f64, f64),
        Miss,
        Broken,
    }

    #[async_trait]
    impl Geocoder for Canned {
        async fn lookup(&self, _place: &str) -> Result<Option<Coordinates>, GeocodeError> {
            match self {
                Canned::Hit(lat, lon) => Ok(Some(Coordinates::new(*lat, *lon))),
                Canned::Miss => Ok(None),
                Canned::Broken => Err(GeocodeError::Parse("garbage".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn resolve_found() {
        let res = resolve(&Canned::Hit(59.91, 10.75), "Oslo").await;
        assert!(matches!(res, Resolution::Found(c) if c == Coordinates::new(59.91, 10.75)));
    }

    #[tokio::test]
    async fn miss_and_service_error_stay_distinct() {
        let miss = resolve(&Canned::Miss, "Atlantis").await;
        let broken = resolve(&Canned::Broken, "Oslo").await;

        assert!(matches!(miss, Resolution::NotFound));
        assert!(matches!(broken, Resolution::ServiceError(GeocodeError::Parse(_))));
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let cfg = GeocoderConfig {
            base_url: "http://localhost:1234/".to_string(),
            ..GeocoderConfig::default()
        };
        let geocoder = NominatimGeocoder::new(&cfg).unwrap();
        assert_eq!(geocoder.base_url, "http://localhost:1234");
    }

    #[test]
    fn nominatim_place_parses_string_coordinates() {
        let json = r#"[{"lat": "48.8566", "lon": "2.3522", "display_name": "Paris"}]"#;
        let places: Vec<NominatimPlace> = serde_json::from_str(json).unwrap();
        assert_eq!(places[0].lat, "48.8566");
        assert_eq!(places[0].lon, "2.3522");
    }
}

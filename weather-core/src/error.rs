use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Failed to send request to geocoding service: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Geocoding request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse geocoding response: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Failed to send request to forecast API ({what}): {source}")]
    Request {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Forecast API {what} request failed with status {status}: {body}")]
    Status { what: &'static str, status: StatusCode, body: String },

    #[error("Failed to parse forecast API {what} JSON: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

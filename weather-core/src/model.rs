use serde::{Deserialize, Serialize, Serializer};

/// Marker emitted in place of an upstream reading that was not supplied.
pub const NOT_AVAILABLE: &str = "N/A";

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Raw inbound parameters, exactly as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
    pub hour: Option<String>,
}

impl WeatherQuery {
    pub fn new(city: impl Into<String>, hour: impl Into<String>) -> Self {
        Self { city: Some(city.into()), hour: Some(hour.into()) }
    }
}

/// Conditions at the moment of the request.
///
/// `humidity` and `pressure` may be locally fabricated placeholders when the
/// upstream payload omits them; see [`crate::placeholder`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    /// Local process time of the fetch, `%Y-%m-%d %H:%M:%S`.
    pub date: String,
    #[serde(serialize_with = "value_or_not_available")]
    pub temperature: Option<f64>,
    #[serde(serialize_with = "value_or_not_available")]
    pub wind_speed: Option<f64>,
    #[serde(serialize_with = "value_or_not_available")]
    pub wind_direction: Option<f64>,
    pub humidity: f64,
    pub pressure: f64,
}

/// One slot of today's hourly wind series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyWeatherPoint {
    pub time: String,
    pub wind_speed: f64,
    pub wind_direction: f64,
}

/// Successful handler payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub current_weather: CurrentWeather,
    pub hourly_weather: Vec<HourlyWeatherPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Message(String),
    Report(WeatherReport),
}

/// Status code plus body, serialized as `{"statusCode": .., "body": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ResponseBody,
}

impl HandlerResponse {
    pub fn ok(report: WeatherReport) -> Self {
        Self { status_code: 200, body: ResponseBody::Report(report) }
    }

    pub fn message(status_code: u16, message: impl Into<String>) -> Self {
        Self { status_code, body: ResponseBody::Message(message.into()) }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match &self.body {
            ResponseBody::Report(report) => Some(report),
            ResponseBody::Message(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Message(msg) => Some(msg),
            ResponseBody::Report(_) => None,
        }
    }
}

fn value_or_not_available<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => s.serialize_f64(*v),
        None => s.serialize_str(NOT_AVAILABLE),
    }
}

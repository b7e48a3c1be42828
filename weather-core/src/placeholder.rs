//! Fallback values for readings the forecast API leaves out.
//!
//! Values produced here are fabricated, not measured. They exist so that a
//! response always carries a plausible number for every field.

use std::fmt::Debug;

use rand::RngExt;
use serde::{Deserialize, Serialize};

/// Interval a placeholder is drawn from.
///
/// When `whole` is set the value is an integer; otherwise `high` is treated as
/// exclusive so that e.g. a direction range never yields both 0 and 360.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceholderRange {
    pub low: f64,
    pub high: f64,
    pub whole: bool,
}

/// Relative humidity, percent.
pub const HUMIDITY: PlaceholderRange = PlaceholderRange { low: 30.0, high: 90.0, whole: true };

/// Mean sea level pressure, hPa.
pub const PRESSURE: PlaceholderRange = PlaceholderRange { low: 980.0, high: 1050.0, whole: true };

/// Hourly 10 m wind speed: a base of 5 with -2/+3 jitter.
pub const HOURLY_WIND_SPEED: PlaceholderRange =
    PlaceholderRange { low: 5.0 - 2.0, high: 5.0 + 3.0, whole: false };

/// Wind direction, degrees.
pub const WIND_DIRECTION: PlaceholderRange =
    PlaceholderRange { low: 0.0, high: 360.0, whole: false };

impl PlaceholderRange {
    pub fn contains(&self, value: f64) -> bool {
        if self.whole {
            value >= self.low && value <= self.high && value.fract() == 0.0
        } else {
            value >= self.low && value < self.high
        }
    }
}

/// Source of substitute values for missing upstream fields.
pub trait PlaceholderSource: Send + Sync + Debug {
    /// Returns a value inside `range`.
    fn sample(&self, range: &PlaceholderRange) -> f64;
}

/// Uniformly random placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPlaceholders;

impl PlaceholderSource for RandomPlaceholders {
    fn sample(&self, range: &PlaceholderRange) -> f64 {
        let mut rng = rand::rng();
        if range.whole {
            rng.random_range(range.low as i64..=range.high as i64) as f64
        } else {
            rng.random_range(range.low..range.high)
        }
    }
}

/// Deterministic placeholders: always the middle of the range.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidpointPlaceholders;

impl PlaceholderSource for MidpointPlaceholders {
    fn sample(&self, range: &PlaceholderRange) -> f64 {
        let mid = (range.low + range.high) / 2.0;
        if range.whole { mid.floor() } else { mid }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderMode {
    #[default]
    Random,
    Midpoint,
}

impl PlaceholderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderMode::Random => "random",
            PlaceholderMode::Midpoint => "midpoint",
        }
    }

    pub const fn all() -> &'static [PlaceholderMode] {
        &[PlaceholderMode::Random, PlaceholderMode::Midpoint]
    }

    pub fn source(&self) -> Box<dyn PlaceholderSource> {
        match self {
            PlaceholderMode::Random => Box::new(RandomPlaceholders),
            PlaceholderMode::Midpoint => Box::new(MidpointPlaceholders),
        }
    }
}

impl std::fmt::Display for PlaceholderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_values_stay_in_range() {
        let source = RandomPlaceholders;
        for range in [HUMIDITY, PRESSURE, HOURLY_WIND_SPEED, WIND_DIRECTION] {
            for _ in 0..500 {
                let v = source.sample(&range);
                assert!(range.contains(v), "{v} outside {range:?}");
            }
        }
    }

    #[test]
    fn whole_ranges_yield_integers() {
        let source = RandomPlaceholders;
        for _ in 0..100 {
            assert_eq!(source.sample(&HUMIDITY).fract(), 0.0);
            assert_eq!(source.sample(&PRESSURE).fract(), 0.0);
        }
    }

    #[test]
    fn midpoint_is_deterministic() {
        let source = MidpointPlaceholders;
        assert_eq!(source.sample(&HUMIDITY), 60.0);
        assert_eq!(source.sample(&PRESSURE), 1015.0);
        assert_eq!(source.sample(&HOURLY_WIND_SPEED), 5.5);
        assert_eq!(source.sample(&WIND_DIRECTION), 180.0);
        assert!(HUMIDITY.contains(source.sample(&HUMIDITY)));
    }

    #[test]
    fn wind_speed_range_is_base_five_with_jitter() {
        assert_eq!(HOURLY_WIND_SPEED.low, 3.0);
        assert_eq!(HOURLY_WIND_SPEED.high, 8.0);
    }

    #[test]
    fn direction_excludes_upper_bound() {
        assert!(WIND_DIRECTION.contains(0.0));
        assert!(!WIND_DIRECTION.contains(360.0));
    }

    #[test]
    fn mode_deserializes_lowercase() {
        let mode: PlaceholderMode = serde_json::from_str("\"midpoint\"").unwrap();
        assert_eq!(mode, PlaceholderMode::Midpoint);
        assert_eq!(PlaceholderMode::default().to_string(), "random");
    }
}

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Location key and display label kept in the location store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedLocation {
    pub key: String,
    pub label: String,
}

impl PersistedLocation {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self { key: key.into(), label: label.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A place as returned by the geoposition and city search endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub key: String,
    pub localized_name: String,
    pub administrative_area: String,
    pub country: String,
}

impl Place {
    /// "City, Region, Country"
    pub fn label(&self) -> String {
        format!("{}, {}, {}", self.localized_name, self.administrative_area, self.country)
    }
}

/// One row of a city search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub key: String,
    pub label: String,
}

impl From<&Place> for LocationCandidate {
    fn from(place: &Place) -> Self {
        Self { key: place.key.clone(), label: place.label() }
    }
}

impl From<LocationCandidate> for PersistedLocation {
    fn from(candidate: LocationCandidate) -> Self {
        Self { key: candidate.key, label: candidate.label }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: DateTime<FixedOffset>,
    pub icon: u8,
    pub max_temp: f64,
    pub min_temp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiveDayForecast {
    pub headline_text: String,
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_metric: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub localized_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    pub date_time: DateTime<FixedOffset>,
    pub temperature: f64,
}

/// The four payloads fetched for a single location key.
///
/// Only [`crate::fetcher::WeatherDataFetcher`] builds these from live data, after
/// every part has arrived and passed [`WeatherSnapshot::missing_part`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub five_day: FiveDayForecast,
    pub current_day: Vec<CurrentConditions>,
    pub location_info: LocationInfo,
    pub hourly: Vec<HourlySample>,
}

/// Number of hourly samples the hourly strip reads from.
pub const MIN_HOURLY_SAMPLES: usize = 8;

impl WeatherSnapshot {
    /// Describes the first piece of data the renderer needs but the snapshot lacks.
    pub fn missing_part(&self) -> Option<String> {
        if self.five_day.days.is_empty() {
            return Some("five-day forecast contained no days".to_string());
        }
        if self.current_day.is_empty() {
            return Some("current conditions were empty".to_string());
        }
        if self.hourly.len() < MIN_HOURLY_SAMPLES {
            return Some(format!(
                "hourly forecast had {} samples, expected at least {MIN_HOURLY_SAMPLES}",
                self.hourly.len()
            ));
        }
        None
    }
}

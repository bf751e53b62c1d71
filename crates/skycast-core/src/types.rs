//! Core data types for weather samples, daily summaries and alerts

use chrono::{DateTime, FixedOffset, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::conditions::ConditionCode;

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A resolved location: display name plus coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub name: String,
    pub coordinates: Coordinates,
}

/// One 3-hourly forecast sample as delivered by the weather provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSample {
    /// Valid time, in the location's own UTC offset
    pub timestamp: DateTime<FixedOffset>,

    /// Temperature (°C)
    pub temperature: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_min: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_max: Option<f64>,

    /// Cloud cover percentage [0, 100]
    pub cloud_cover: u8,

    /// Precipitation volume for the sample's window (mm)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precipitation_mm: Option<f64>,

    pub condition: ConditionCode,
}

impl WeatherSample {
    /// True when the sample reports a measurable amount of precipitation
    pub fn reports_rain(&self) -> bool {
        self.precipitation_mm.is_some_and(|mm| mm > 0.0)
    }
}

/// Current conditions, with today's high/low already resolved upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub observed_at: DateTime<FixedOffset>,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_speed_kmh: f64,

    /// `None` when the provider does not supply a UV index
    pub uv_index: Option<u8>,

    pub cloud_cover: u8,

    /// `Some` while precipitation is active; the value is the last hour's volume (mm)
    pub rain: Option<f64>,

    pub condition: ConditionCode,
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
}

/// Five-way presentation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeatherCategory {
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
    PartlyCloudy,
}

/// Label shown on a forecast card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayLabel {
    Today,
    Weekday(Weekday),
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayLabel::Today => f.write_str("Today"),
            DayLabel::Weekday(day) => write!(f, "{}", day),
        }
    }
}

impl FromStr for DayLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "Today" {
            return Ok(DayLabel::Today);
        }
        s.parse::<Weekday>()
            .map(DayLabel::Weekday)
            .map_err(|_| format!("invalid day label: {}", s))
    }
}

impl Serialize for DayLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One derived day of the forecast strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub day: DayLabel,
    pub date: NaiveDate,
    pub high_temp: i32,
    pub low_temp: i32,
    pub weather_type: WeatherCategory,

    /// Percentage [0, 100]
    pub rain_chance: u8,

    /// Expected accumulation (mm); `None` means not estimated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<f64>,

    /// Not clamped: the decay can in principle go non-positive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<i32>,
}

/// Canonical per-location dashboard record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub location: String,
    pub current_temp: i32,
    pub feels_like: i32,
    pub high_temp: i32,
    pub low_temp: i32,
    pub description: String,
    pub humidity: u8,

    /// km/h
    pub wind_speed: i32,

    pub uv_index: u8,
    pub sunrise: String,
    pub sunset: String,

    /// `forecast[0]` is today; at most five later days follow
    pub forecast: Vec<DailyForecast>,
}

impl WeatherData {
    pub fn today(&self) -> Option<&DailyForecast> {
        self.forecast.first()
    }

    pub fn tomorrow(&self) -> Option<&DailyForecast> {
        self.forecast.get(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Info,
}

/// Which threshold rule produced an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertKind {
    HighTemperature,
    HighUv,
    Rain,
    TemperatureDrop,
    HighWind,
}

impl AlertKind {
    pub fn title(&self) -> &'static str {
        match self {
            AlertKind::HighTemperature => "High Temperature Alert",
            AlertKind::HighUv => "High UV Alert",
            AlertKind::Rain => "Rain Alert",
            AlertKind::TemperatureDrop => "Temperature Drop Alert",
            AlertKind::HighWind => "High Wind Alert",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            AlertKind::HighTemperature | AlertKind::HighUv | AlertKind::HighWind => {
                Severity::Warning
            }
            AlertKind::Rain | AlertKind::TemperatureDrop => Severity::Info,
        }
    }
}

/// A notification ready for a sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

impl Alert {
    pub fn new(kind: AlertKind, description: String) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            title: kind.title().to_string(),
            description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_label_serde() {
        let json = serde_json::to_string(&DayLabel::Weekday(Weekday::Tue)).unwrap();
        assert_eq!(json, "\"Tue\"");
        let json = serde_json::to_string(&DayLabel::Today).unwrap();
        assert_eq!(json, "\"Today\"");

        let parsed: DayLabel = serde_json::from_str("\"Sat\"").unwrap();
        assert_eq!(parsed, DayLabel::Weekday(Weekday::Sat));
        assert!(serde_json::from_str::<DayLabel>("\"Someday\"").is_err());
    }

    #[test]
    fn test_category_serializes_camel_case() {
        let json = serde_json::to_string(&WeatherCategory::PartlyCloudy).unwrap();
        assert_eq!(json, "\"partlyCloudy\"");
    }

    #[test]
    fn test_alert_kind_severity() {
        let alert = Alert::new(AlertKind::Rain, "70% chance".into());
        assert_eq!(alert.severity, Severity::Info);
        assert_eq!(alert.title, "Rain Alert");
        assert_eq!(AlertKind::HighWind.severity(), Severity::Warning);
    }

    #[test]
    fn test_sample_reports_rain() {
        let sample = WeatherSample {
            timestamp: DateTime::parse_from_rfc3339("2024-06-01T12:00:00+05:30").unwrap(),
            temperature: 30.0,
            temp_min: None,
            temp_max: None,
            cloud_cover: 40,
            precipitation_mm: Some(0.0),
            condition: ConditionCode::ScatteredClouds,
        };
        assert!(!sample.reports_rain());

        let wet = WeatherSample {
            precipitation_mm: Some(0.4),
            ..sample
        };
        assert!(wet.reports_rain());
    }
}

//! Provider condition codes and the fixed category table
//!
//! Codes follow the OpenWeather condition id groups:
//! https://openweathermap.org/weather-conditions

use crate::types::WeatherCategory;
use serde::{Deserialize, Serialize};

/// Closed set of sky-condition codes accepted from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionCode {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    /// Mist, smoke, haze, dust, fog, sand, ash, squall, tornado
    Atmosphere,
    Clear,
    FewClouds,
    ScatteredClouds,
    BrokenClouds,
    Overcast,
}

impl ConditionCode {
    /// Parse a numeric condition id. Unknown ids are rejected.
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            200..=299 => Some(Self::Thunderstorm),
            300..=399 => Some(Self::Drizzle),
            500..=599 => Some(Self::Rain),
            600..=699 => Some(Self::Snow),
            700..=799 => Some(Self::Atmosphere),
            800 => Some(Self::Clear),
            801 => Some(Self::FewClouds),
            802 => Some(Self::ScatteredClouds),
            803 => Some(Self::BrokenClouds),
            804 => Some(Self::Overcast),
            _ => None,
        }
    }

    pub fn category(&self) -> WeatherCategory {
        match self {
            Self::Clear | Self::FewClouds => WeatherCategory::Sunny,
            Self::ScatteredClouds | Self::BrokenClouds => WeatherCategory::PartlyCloudy,
            Self::Drizzle | Self::Rain => WeatherCategory::Rainy,
            Self::Thunderstorm => WeatherCategory::Stormy,
            Self::Overcast | Self::Snow | Self::Atmosphere => WeatherCategory::Cloudy,
        }
    }

    /// Generic wording for the group, used when the provider gives none
    pub fn description(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "thunderstorm",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Atmosphere => "mist",
            Self::Clear => "clear sky",
            Self::FewClouds => "few clouds",
            Self::ScatteredClouds => "scattered clouds",
            Self::BrokenClouds => "broken clouds",
            Self::Overcast => "overcast clouds",
        }
    }
}

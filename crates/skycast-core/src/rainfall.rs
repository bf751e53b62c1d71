//! Rainfall outlook for the dashboard's rainfall view

use serde::{Deserialize, Serialize};

use crate::types::{DailyForecast, DayLabel, WeatherData};

/// Rain chance above which a day is highlighted in the outlook
pub const EMPHASIS_CHANCE_PCT: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(score: i32) -> Self {
        if score > 70 {
            ConfidenceLevel::High
        } else if score > 40 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainfallPrediction {
    pub chance: u8,
    pub amount_mm: f64,
    pub confidence_score: Option<i32>,
    pub confidence: Option<ConfidenceLevel>,
}

impl From<&DailyForecast> for RainfallPrediction {
    fn from(day: &DailyForecast) -> Self {
        Self {
            chance: day.rain_chance,
            amount_mm: day.rainfall.unwrap_or(0.0),
            confidence_score: day.confidence_score,
            confidence: day.confidence_score.map(ConfidenceLevel::from_score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainBar {
    pub day: DayLabel,
    pub rain_chance: u8,
    pub emphasized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainfallOutlook {
    /// Sum of estimated rainfall over every forecast day (mm)
    pub cumulative_mm: f64,
    pub next_24_hours: Option<RainfallPrediction>,
    pub tomorrow: Option<RainfallPrediction>,
    pub days: Vec<RainBar>,
}

pub fn rainfall_outlook(data: &WeatherData) -> RainfallOutlook {
    RainfallOutlook {
        cumulative_mm: data.forecast.iter().filter_map(|d| d.rainfall).sum(),
        next_24_hours: data.today().map(RainfallPrediction::from),
        tomorrow: data.tomorrow().map(RainfallPrediction::from),
        days: data
            .forecast
            .iter()
            .map(|d| RainBar {
                day: d.day,
                rain_chance: d.rain_chance,
                emphasized: d.rain_chance > EMPHASIS_CHANCE_PCT,
            })
            .collect(),
    }
}

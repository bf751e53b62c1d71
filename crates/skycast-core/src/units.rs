//! Unit conversion and display helpers

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Wind speed units the providers report in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    MetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
}

impl SpeedUnit {
    fn meters_per_second(&self) -> f64 {
        match self {
            SpeedUnit::MetersPerSecond => 1.0,
            SpeedUnit::KilometersPerHour => 1.0 / 3.6,
            SpeedUnit::MilesPerHour => 0.44704,
        }
    }
}

/// Convert a speed between units
pub fn convert_speed(value: f64, from: SpeedUnit, to: SpeedUnit) -> f64 {
    if from == to {
        return value;
    }
    value * from.meters_per_second() / to.meters_per_second()
}

/// Round to the nearest integer, ties toward positive infinity (-2.5 -> -2, 2.5 -> 3)
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Format a local time of day as `hh:mm AM/PM`
pub fn format_time_of_day(at: &DateTime<FixedOffset>) -> String {
    at.format("%I:%M %p").to_string()
}

/// UV exposure level on the WHO scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UvLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvLevel {
    pub fn from_index(index: u8) -> Self {
        match index {
            0..=2 => UvLevel::Low,
            3..=5 => UvLevel::Moderate,
            6..=7 => UvLevel::High,
            8..=10 => UvLevel::VeryHigh,
            _ => UvLevel::Extreme,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UvLevel::Low => "Low",
            UvLevel::Moderate => "Moderate",
            UvLevel::High => "High",
            UvLevel::VeryHigh => "Very High",
            UvLevel::Extreme => "Extreme",
        }
    }
}

/// Display label such as `6 (High)`
pub fn uv_label(index: u8) -> String {
    format!("{} ({})", index, UvLevel::from_index(index).name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_conversion() {
        let kmh = convert_speed(10.0, SpeedUnit::MetersPerSecond, SpeedUnit::KilometersPerHour);
        assert!((kmh - 36.0).abs() < 1e-9);

        let ms = convert_speed(36.0, SpeedUnit::KilometersPerHour, SpeedUnit::MetersPerSecond);
        assert!((ms - 10.0).abs() < 1e-9);

        let mph = convert_speed(1.0, SpeedUnit::MetersPerSecond, SpeedUnit::MilesPerHour);
        assert!((mph - 2.236_936).abs() < 1e-5);
    }

    #[test]
    fn test_same_unit_conversion() {
        assert_eq!(
            convert_speed(7.5, SpeedUnit::MilesPerHour, SpeedUnit::MilesPerHour),
            7.5
        );
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.51), -3);
        assert_eq!(round_half_up(0.0), 0);
    }

    #[test]
    fn test_format_time_of_day() {
        let at = DateTime::parse_from_rfc3339("2024-06-01T18:53:00+05:30").unwrap();
        assert_eq!(format_time_of_day(&at), "06:53 PM");
        let at = DateTime::parse_from_rfc3339("2024-06-01T06:12:00+05:30").unwrap();
        assert_eq!(format_time_of_day(&at), "06:12 AM");
    }

    #[test]
    fn test_uv_levels() {
        assert_eq!(UvLevel::from_index(0), UvLevel::Low);
        assert_eq!(UvLevel::from_index(5), UvLevel::Moderate);
        assert_eq!(UvLevel::from_index(7), UvLevel::High);
        assert_eq!(UvLevel::from_index(8), UvLevel::VeryHigh);
        assert_eq!(UvLevel::from_index(11), UvLevel::Extreme);
        assert_eq!(uv_label(6), "6 (High)");
    }
}

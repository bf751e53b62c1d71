//! Threshold alerts derived from a finished dashboard record
//!
//! Rules are independent and evaluated in a fixed order; any number may
//! fire. Evaluation is stateless, so the same record always yields the same
//! alerts in the same order.

use serde::Serialize;
use tracing::warn;

use crate::pipeline::AlertSink;
use crate::types::{Alert, AlertKind, WeatherData};

pub const HIGH_TEMPERATURE_C: i32 = 35;
pub const HIGH_UV_INDEX: u8 = 8;
pub const RAIN_CHANCE_PCT: u8 = 60;
pub const TEMPERATURE_DROP_C: i32 = 5;
pub const HIGH_WIND_KMH: i32 = 20;

type Rule = fn(&WeatherData) -> Option<Alert>;

const RULES: [Rule; 5] = [
    high_temperature,
    high_uv,
    rain_tomorrow,
    temperature_drop,
    high_wind,
];

fn high_temperature(data: &WeatherData) -> Option<Alert> {
    (data.current_temp > HIGH_TEMPERATURE_C).then(|| {
        Alert::new(
            AlertKind::HighTemperature,
            format!(
                "Current temperature is {}°C. Stay hydrated and avoid direct sun exposure.",
                data.current_temp
            ),
        )
    })
}

fn high_uv(data: &WeatherData) -> Option<Alert> {
    (data.uv_index >= HIGH_UV_INDEX).then(|| {
        Alert::new(
            AlertKind::HighUv,
            format!(
                "UV Index is high ({}). Use sunscreen and protective clothing.",
                data.uv_index
            ),
        )
    })
}

fn rain_tomorrow(data: &WeatherData) -> Option<Alert> {
    let tomorrow = data.tomorrow()?;
    (tomorrow.rain_chance > RAIN_CHANCE_PCT).then(|| {
        Alert::new(
            AlertKind::Rain,
            format!(
                "{}% chance of rain tomorrow. Consider adjusting outdoor plans.",
                tomorrow.rain_chance
            ),
        )
    })
}

fn temperature_drop(data: &WeatherData) -> Option<Alert> {
    let today = data.today()?;
    let tomorrow = data.tomorrow()?;
    let drop = today.high_temp - tomorrow.high_temp;
    (drop > TEMPERATURE_DROP_C).then(|| {
        Alert::new(
            AlertKind::TemperatureDrop,
            format!("Temperature will drop by {}°C tomorrow.", drop),
        )
    })
}

fn high_wind(data: &WeatherData) -> Option<Alert> {
    (data.wind_speed > HIGH_WIND_KMH).then(|| {
        Alert::new(
            AlertKind::HighWind,
            format!(
                "Wind speeds of {} km/h. Secure loose outdoor items.",
                data.wind_speed
            ),
        )
    })
}

/// Evaluate every rule in order
pub fn evaluate_alerts(data: &WeatherData) -> Vec<Alert> {
    RULES.iter().filter_map(|rule| rule(data)).collect()
}

/// Outcome of delivering alerts to a sink
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub delivered: Vec<Alert>,
    pub failed: Vec<Alert>,
}

impl DispatchReport {
    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.delivered.iter().chain(self.failed.iter())
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Evaluate and deliver each alert as it is produced.
///
/// A failing sink does not stop the remaining rules from being evaluated
/// and attempted.
pub async fn notify_alerts(data: &WeatherData, sink: &mut dyn AlertSink) -> DispatchReport {
    let mut report = DispatchReport::default();

    for rule in RULES.iter() {
        let Some(alert) = rule(data) else {
            continue;
        };
        match sink.notify(&alert).await {
            Ok(()) => report.delivered.push(alert),
            Err(e) => {
                warn!(error = %e, title = %alert.title, "Failed to deliver alert");
                report.failed.push(alert);
            }
        }
    }

    report
}

//! Forecast aggregation: current conditions + 3-hourly samples -> dashboard record

use chrono::{DateTime, Datelike, FixedOffset};
use tracing::debug;

use crate::rollups::{bucket_by_day, DayBucket, Rollup};
use crate::types::{CurrentConditions, DailyForecast, DayLabel, WeatherData, WeatherSample};
use crate::units::{format_time_of_day, round_half_up};

/// Number of days after today included in the forecast strip
pub const FUTURE_DAYS: usize = 5;

/// UV index reported when the provider has none
pub const UV_PLACEHOLDER: u8 = 6;

const TODAY_CONFIDENCE: i32 = 90;
const FIRST_DAY_CONFIDENCE: i32 = 80;
const CONFIDENCE_DECAY: i32 = 5;
const ACTIVE_RAIN_CHANCE: u8 = 80;

/// Build the dashboard record for one location.
///
/// Deterministic for identical inputs and `now`; today is `now`'s calendar
/// date in `now`'s own offset.
pub fn aggregate(
    location: &str,
    current: &CurrentConditions,
    samples: &[WeatherSample],
    now: DateTime<FixedOffset>,
) -> WeatherData {
    let today = now.date_naive();
    let buckets = bucket_by_day(samples, today, FUTURE_DAYS);

    debug!(
        location,
        samples = samples.len(),
        days = buckets.len(),
        "Aggregating forecast"
    );

    let today_card = summarize_today(current, now);
    let (high_temp, low_temp) = (today_card.high_temp, today_card.low_temp);
    let mut forecast = Vec::with_capacity(1 + buckets.len());
    forecast.push(today_card);
    forecast.extend(
        buckets
            .iter()
            .enumerate()
            .map(|(i, bucket)| summarize_bucket(bucket, i + 1)),
    );

    WeatherData {
        location: location.to_string(),
        current_temp: round_half_up(current.temperature),
        feels_like: round_half_up(current.feels_like),
        high_temp,
        low_temp,
        description: current.description.clone(),
        humidity: current.humidity,
        wind_speed: round_half_up(current.wind_speed_kmh),
        uv_index: current.uv_index.unwrap_or(UV_PLACEHOLDER),
        sunrise: format_time_of_day(&current.sunrise),
        sunset: format_time_of_day(&current.sunset),
        forecast,
    }
}

/// Today's card comes straight from the current conditions
fn summarize_today(current: &CurrentConditions, now: DateTime<FixedOffset>) -> DailyForecast {
    let a = round_half_up(current.temp_min);
    let b = round_half_up(current.temp_max);

    DailyForecast {
        day: DayLabel::Today,
        date: now.date_naive(),
        high_temp: a.max(b),
        low_temp: a.min(b),
        weather_type: current.condition.category(),
        rain_chance: if current.rain.is_some() {
            ACTIVE_RAIN_CHANCE
        } else {
            current.cloud_cover.min(100)
        },
        rainfall: Some(current.rain.unwrap_or(0.0)),
        confidence_score: Some(TODAY_CONFIDENCE),
    }
}

/// Summary for the `index`-th future day (1-based)
fn summarize_bucket(bucket: &DayBucket<'_>, index: usize) -> DailyForecast {
    DailyForecast {
        day: DayLabel::Weekday(bucket.date().weekday()),
        date: bucket.date(),
        high_temp: round_half_up(bucket.temperature(Rollup::Max)),
        low_temp: round_half_up(bucket.temperature(Rollup::Min)),
        weather_type: bucket.middle().condition.category(),
        rain_chance: rain_chance(bucket),
        rainfall: Some(bucket.rainfall()),
        confidence_score: Some(confidence_for_day(index)),
    }
}

/// Share of samples with rain; falls back to half the first sample's cloud cover
fn rain_chance(bucket: &DayBucket<'_>) -> u8 {
    let share = bucket.rainy_samples() as f64 / bucket.len() as f64 * 100.0;
    let chance = match round_half_up(share) {
        0 => round_half_up(f64::from(bucket.first().cloud_cover) / 2.0),
        pct => pct,
    };
    chance.clamp(0, 100) as u8
}

/// 80 for the first future day, minus 5 for each day after
pub fn confidence_for_day(index: usize) -> i32 {
    FIRST_DAY_CONFIDENCE - CONFIDENCE_DECAY * index.saturating_sub(1) as i32
}

//! OpenWeather response shapes and their conversion into core records
//!
//! Only the fields the dashboard needs are declared; anything missing or
//! out of range is reported as `MalformedResponse` here rather than
//! leaking half-filled records into the core.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use skycast_core::{
    convert_speed, ConditionCode, Coordinates, CurrentConditions, DashboardError,
    DashboardResult, GeoLocation, SpeedUnit, WeatherSample,
};

#[derive(Debug, Deserialize)]
pub struct GeoEntry {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: Option<String>,
}

impl From<GeoEntry> for GeoLocation {
    fn from(entry: GeoEntry) -> Self {
        GeoLocation {
            name: entry.name,
            coordinates: Coordinates::new(entry.lat, entry.lon),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    pub id: u16,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CurrentMain {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
}

#[derive(Debug, Deserialize)]
pub struct SampleMain {
    pub temp: f64,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Wind {
    /// m/s with `units=metric`
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub struct Clouds {
    pub all: u8,
}

#[derive(Debug, Default, Deserialize)]
pub struct Precipitation {
    #[serde(rename = "1h")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h")]
    pub three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Sys {
    pub sunrise: i64,
    pub sunset: i64,
}

/// `/data/2.5/weather`
#[derive(Debug, Deserialize)]
pub struct CurrentResponse {
    pub dt: i64,
    pub timezone: i32,
    pub weather: Vec<Condition>,
    pub main: CurrentMain,
    pub wind: Wind,
    pub clouds: Clouds,
    pub rain: Option<Precipitation>,
    pub sys: Sys,
    pub uvi: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    pub main: SampleMain,
    pub weather: Vec<Condition>,
    pub clouds: Clouds,
    pub rain: Option<Precipitation>,
}

#[derive(Debug, Deserialize)]
pub struct City {
    pub timezone: i32,
}

/// `/data/2.5/forecast`
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastEntry>,
    pub city: City,
}

fn malformed(msg: impl Into<String>) -> DashboardError {
    DashboardError::MalformedResponse(msg.into())
}

fn offset(seconds: i32) -> DashboardResult<FixedOffset> {
    FixedOffset::east_opt(seconds).ok_or_else(|| malformed(format!("invalid utc offset {}", seconds)))
}

fn local_time(unix: i64, offset: &FixedOffset) -> DashboardResult<DateTime<FixedOffset>> {
    DateTime::from_timestamp(unix, 0)
        .map(|utc| utc.with_timezone(offset))
        .ok_or_else(|| malformed(format!("invalid timestamp {}", unix)))
}

fn primary_condition(conditions: &[Condition]) -> DashboardResult<(&Condition, ConditionCode)> {
    let first = conditions
        .first()
        .ok_or_else(|| malformed("empty weather condition list"))?;
    let code = ConditionCode::from_id(first.id)
        .ok_or_else(|| malformed(format!("unknown condition id {}", first.id)))?;
    Ok((first, code))
}

impl TryFrom<CurrentResponse> for CurrentConditions {
    type Error = DashboardError;

    fn try_from(resp: CurrentResponse) -> DashboardResult<Self> {
        let tz = offset(resp.timezone)?;
        let (condition, code) = primary_condition(&resp.weather)?;

        Ok(CurrentConditions {
            observed_at: local_time(resp.dt, &tz)?,
            temperature: resp.main.temp,
            feels_like: resp.main.feels_like,
            temp_min: resp.main.temp_min,
            temp_max: resp.main.temp_max,
            description: condition.description.clone(),
            humidity: resp.main.humidity,
            wind_speed_kmh: convert_speed(
                resp.wind.speed,
                SpeedUnit::MetersPerSecond,
                SpeedUnit::KilometersPerHour,
            ),
            uv_index: resp.uvi.map(|uv| uv.round().clamp(0.0, 20.0) as u8),
            cloud_cover: resp.clouds.all,
            rain: resp.rain.map(|r| r.one_hour.unwrap_or(0.0)),
            condition: code,
            sunrise: local_time(resp.sys.sunrise, &tz)?,
            sunset: local_time(resp.sys.sunset, &tz)?,
        })
    }
}

impl ForecastResponse {
    /// Convert every entry, placing timestamps in the city's offset
    pub fn into_samples(self) -> DashboardResult<Vec<WeatherSample>> {
        let tz = offset(self.city.timezone)?;
        self.list
            .into_iter()
            .map(|entry| {
                let (_, code) = primary_condition(&entry.weather)?;
                Ok(WeatherSample {
                    timestamp: local_time(entry.dt, &tz)?,
                    temperature: entry.main.temp,
                    temp_min: entry.main.temp_min,
                    temp_max: entry.main.temp_max,
                    cloud_cover: entry.clouds.all,
                    precipitation_mm: entry.rain.and_then(|r| r.three_hours),
                    condition: code,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT: &str = r#"{
        "coord": {"lon": 72.85, "lat": 19.01},
        "weather": [{"id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d"}],
        "main": {"temp": 31.4, "feels_like": 33.6, "temp_min": 24.2, "temp_max": 32.5, "pressure": 1008, "humidity": 65},
        "wind": {"speed": 5.0, "deg": 250},
        "clouds": {"all": 40},
        "dt": 1717389000,
        "sys": {"country": "IN", "sunrise": 1717375320, "sunset": 1717421580},
        "timezone": 19800,
        "name": "Mumbai"
    }"#;

    #[test]
    fn test_current_conversion() {
        let resp: CurrentResponse = serde_json::from_str(CURRENT).unwrap();
        let current = CurrentConditions::try_from(resp).unwrap();

        assert_eq!(current.condition, ConditionCode::ScatteredClouds);
        assert_eq!(current.description, "scattered clouds");
        assert!((current.wind_speed_kmh - 18.0).abs() < 1e-9);
        assert_eq!(current.rain, None);
        assert_eq!(current.uv_index, None);
        assert_eq!(current.observed_at.offset().local_minus_utc(), 19800);
        assert_eq!(current.observed_at.to_rfc3339(), "2024-06-03T10:00:00+05:30");
    }

    #[test]
    fn test_current_rain_without_volume_counts_as_active() {
        let json = CURRENT.replace(r#""clouds": {"all": 40},"#, r#""clouds": {"all": 40}, "rain": {},"#);
        let resp: CurrentResponse = serde_json::from_str(&json).unwrap();
        let current = CurrentConditions::try_from(resp).unwrap();
        assert_eq!(current.rain, Some(0.0));
    }

    #[test]
    fn test_unknown_condition_is_malformed() {
        let json = CURRENT.replace(r#""id": 802"#, r#""id": 999"#);
        let resp: CurrentResponse = serde_json::from_str(&json).unwrap();
        let err = CurrentConditions::try_from(resp).unwrap_err();
        assert!(matches!(err, DashboardError::MalformedResponse(_)));
    }

    #[test]
    fn test_empty_condition_list_is_malformed() {
        let json = CURRENT.replace(
            r#"[{"id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d"}]"#,
            "[]",
        );
        let resp: CurrentResponse = serde_json::from_str(&json).unwrap();
        assert!(CurrentConditions::try_from(resp).is_err());
    }

    #[test]
    fn test_forecast_samples() {
        let json = r#"{
            "cod": "200",
            "list": [
                {"dt": 1717405200, "main": {"temp": 29.1, "temp_min": 28.0, "temp_max": 29.1},
                 "weather": [{"id": 500, "description": "light rain"}], "clouds": {"all": 88},
                 "rain": {"3h": 0.72}},
                {"dt": 1717416000, "main": {"temp": 28.4},
                 "weather": [{"id": 804, "description": "overcast clouds"}], "clouds": {"all": 100}}
            ],
            "city": {"name": "Mumbai", "timezone": 19800}
        }"#;
        let resp: ForecastResponse = serde_json::from_str(json).unwrap();
        let samples = resp.into_samples().unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].precipitation_mm, Some(0.72));
        assert_eq!(samples[0].condition, ConditionCode::Rain);
        assert_eq!(samples[1].precipitation_mm, None);
        assert_eq!(samples[1].temp_min, None);
        assert_eq!(samples[1].timestamp.to_rfc3339(), "2024-06-03T17:30:00+05:30");
    }
}

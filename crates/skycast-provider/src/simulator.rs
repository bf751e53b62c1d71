//! Simulated provider for offline use and tests

use chrono::{DateTime, Duration, DurationRound, FixedOffset, NaiveTime, Timelike, Utc};
use skycast_core::{
    ConditionCode, Coordinates, CurrentConditions, DashboardError, DashboardResult, GeoLocation,
    Geocoder, WeatherSample, WeatherSource,
};

/// Number of 3-hourly samples generated (six days)
const SAMPLE_COUNT: i64 = 48;

const CONDITION_CYCLE: [ConditionCode; 8] = [
    ConditionCode::Clear,
    ConditionCode::FewClouds,
    ConditionCode::ScatteredClouds,
    ConditionCode::BrokenClouds,
    ConditionCode::Overcast,
    ConditionCode::Drizzle,
    ConditionCode::Rain,
    ConditionCode::Thunderstorm,
];

#[derive(Debug, Clone, Copy)]
struct City {
    name: &'static str,
    latitude: f64,
    longitude: f64,
    utc_offset_secs: i32,
    base_temp: f64,
    humidity: u8,
}

const CITIES: [City; 5] = [
    City {
        name: "Mumbai",
        latitude: 19.0760,
        longitude: 72.8777,
        utc_offset_secs: 19800,
        base_temp: 30.0,
        humidity: 74,
    },
    City {
        name: "Pune",
        latitude: 18.5204,
        longitude: 73.8567,
        utc_offset_secs: 19800,
        base_temp: 27.0,
        humidity: 58,
    },
    City {
        name: "Nagpur",
        latitude: 21.1458,
        longitude: 79.0882,
        utc_offset_secs: 19800,
        base_temp: 34.0,
        humidity: 35,
    },
    City {
        name: "London",
        latitude: 51.5074,
        longitude: -0.1278,
        utc_offset_secs: 0,
        base_temp: 14.0,
        humidity: 81,
    },
    City {
        name: "Seattle",
        latitude: 47.6062,
        longitude: -122.3321,
        utc_offset_secs: -25200,
        base_temp: 16.0,
        humidity: 70,
    },
];

impl City {
    fn seed(&self) -> usize {
        self.name.bytes().map(usize::from).sum()
    }

    fn offset(&self) -> DashboardResult<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_secs).ok_or_else(|| {
            DashboardError::MalformedResponse(format!("invalid offset for {}", self.name))
        })
    }

    fn location(&self) -> GeoLocation {
        GeoLocation {
            name: self.name.to_string(),
            coordinates: Coordinates::new(self.latitude, self.longitude),
        }
    }

    fn distance2(&self, c: Coordinates) -> f64 {
        (self.latitude - c.latitude).powi(2) + (self.longitude - c.longitude).powi(2)
    }
}

/// Deterministic geocoder and weather source over a fixed city table
#[derive(Debug, Clone, Default)]
pub struct SimulatorProvider {
    anchor: Option<DateTime<Utc>>,
}

impl SimulatorProvider {
    /// Simulator anchored to the wall clock at each call
    pub fn new() -> Self {
        Self { anchor: None }
    }

    /// Simulator whose data is generated as of `anchor`
    pub fn with_anchor(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor: Some(anchor),
        }
    }

    pub fn city_names() -> impl Iterator<Item = &'static str> {
        CITIES.iter().map(|c| c.name)
    }

    /// Anchor rounded down to a 3-hour boundary so repeated calls agree
    fn anchor(&self) -> DateTime<Utc> {
        let now = self.anchor.unwrap_or_else(Utc::now);
        now.duration_trunc(Duration::hours(3)).unwrap_or(now)
    }

    fn city_at(&self, coordinates: Coordinates) -> &'static City {
        CITIES
            .iter()
            .min_by(|a, b| a.distance2(coordinates).total_cmp(&b.distance2(coordinates)))
            .unwrap_or(&CITIES[0])
    }

    fn generate_sample(city: &City, at: DateTime<FixedOffset>, i: i64) -> WeatherSample {
        let seed = city.seed() as i64;
        let hour = f64::from(at.hour());
        // warmest mid-afternoon, coolest before dawn
        let diurnal = ((hour - 9.0) / 24.0 * std::f64::consts::TAU).sin() * 4.0;
        let drift = ((i / 8 + seed) % 5) as f64 - 2.0;
        let condition = CONDITION_CYCLE[((seed + i / 4) % CONDITION_CYCLE.len() as i64) as usize];
        let wet = matches!(
            condition,
            ConditionCode::Drizzle | ConditionCode::Rain | ConditionCode::Thunderstorm
        );
        let temperature = city.base_temp + diurnal + drift;

        WeatherSample {
            timestamp: at,
            temperature,
            temp_min: Some(temperature - 0.5),
            temp_max: Some(temperature + 0.5),
            cloud_cover: ((seed + i * 7) % 101) as u8,
            precipitation_mm: wet.then(|| 0.2 + ((seed + i) % 6) as f64 * 0.5),
            condition,
        }
    }
}

#[async_trait::async_trait]
impl Geocoder for SimulatorProvider {
    async fn search(&self, query: &str) -> DashboardResult<GeoLocation> {
        let wanted = query.split(',').next().unwrap_or_default().trim();
        CITIES
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(wanted))
            .map(City::location)
            .ok_or_else(|| DashboardError::LocationNotFound(query.to_string()))
    }

    async fn reverse(&self, coordinates: Coordinates) -> DashboardResult<GeoLocation> {
        let city = self.city_at(coordinates);
        Ok(GeoLocation {
            name: city.name.to_string(),
            coordinates,
        })
    }
}

#[async_trait::async_trait]
impl WeatherSource for SimulatorProvider {
    async fn current(&self, coordinates: Coordinates) -> DashboardResult<CurrentConditions> {
        let city = self.city_at(coordinates);
        let tz = city.offset()?;
        let observed_at = self.anchor().with_timezone(&tz);
        let sample = Self::generate_sample(city, observed_at, 0);

        let day = observed_at.date_naive();
        let local = |h: u32, m: u32| -> DashboardResult<DateTime<FixedOffset>> {
            let time = NaiveTime::from_hms_opt(h, m, 0).ok_or_else(|| {
                DashboardError::MalformedResponse(format!("invalid time {}:{}", h, m))
            })?;
            day.and_time(time)
                .and_local_timezone(tz)
                .single()
                .ok_or_else(|| DashboardError::MalformedResponse("ambiguous local time".into()))
        };

        let seed = city.seed();
        Ok(CurrentConditions {
            observed_at,
            temperature: sample.temperature,
            feels_like: sample.temperature + f64::from(city.humidity) / 40.0,
            temp_min: city.base_temp - 5.0,
            temp_max: city.base_temp + 5.0,
            description: sample.condition.description().to_string(),
            humidity: city.humidity,
            wind_speed_kmh: 6.0 + (seed % 17) as f64,
            uv_index: Some((seed % 12) as u8),
            cloud_cover: sample.cloud_cover,
            rain: sample.precipitation_mm,
            condition: sample.condition,
            sunrise: local(6, (seed % 40) as u32)?,
            sunset: local(18, (seed % 50) as u32)?,
        })
    }

    async fn forecast(&self, coordinates: Coordinates) -> DashboardResult<Vec<WeatherSample>> {
        let city = self.city_at(coordinates);
        let tz = city.offset()?;
        let start = self.anchor() + Duration::hours(3);

        Ok((0..SAMPLE_COUNT)
            .map(|i| {
                let at = (start + Duration::hours(3 * i)).with_timezone(&tz);
                Self::generate_sample(city, at, i)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn anchor() -> DateTime<Utc> {
        "2024-06-03T04:30:00Z".parse().unwrap()
    }

    #[tokio::test]
    async fn test_search_known_city() {
        let sim = SimulatorProvider::new();
        let loc = sim.search("mumbai, India").await.unwrap();
        assert_eq!(loc.name, "Mumbai");

        let err = sim.search("Atlantis").await.unwrap_err();
        assert_eq!(err, DashboardError::LocationNotFound("Atlantis".into()));
    }

    #[tokio::test]
    async fn test_reverse_picks_nearest_city() {
        let sim = SimulatorProvider::new();
        let loc = sim.reverse(Coordinates::new(18.6, 73.7)).await.unwrap();
        assert_eq!(loc.name, "Pune");
        assert_eq!(loc.coordinates, Coordinates::new(18.6, 73.7));
    }

    #[tokio::test]
    async fn test_forecast_covers_six_days() {
        let sim = SimulatorProvider::with_anchor(anchor());
        let loc = sim.search("Seattle").await.unwrap();
        let samples = sim.forecast(loc.coordinates).await.unwrap();

        assert_eq!(samples.len(), SAMPLE_COUNT as usize);
        let dates: BTreeSet<_> = samples.iter().map(|s| s.timestamp.date_naive()).collect();
        assert!(dates.len() >= 6);
        assert!(samples
            .iter()
            .all(|s| s.timestamp.offset().local_minus_utc() == -25200));
    }

    #[tokio::test]
    async fn test_repeated_calls_identical() {
        let sim = SimulatorProvider::with_anchor(anchor());
        let c = Coordinates::new(19.0, 72.8);
        assert_eq!(sim.current(c).await.unwrap(), sim.current(c).await.unwrap());
        assert_eq!(sim.forecast(c).await.unwrap(), sim.forecast(c).await.unwrap());
    }

    #[tokio::test]
    async fn test_current_conditions_are_consistent() {
        let sim = SimulatorProvider::with_anchor(anchor());
        for name in SimulatorProvider::city_names() {
            let loc = sim.search(name).await.unwrap();
            let current = sim.current(loc.coordinates).await.unwrap();
            assert!(current.temp_min <= current.temp_max);
            assert!(current.sunrise < current.sunset);
            assert!(current.cloud_cover <= 100);
        }
    }
}

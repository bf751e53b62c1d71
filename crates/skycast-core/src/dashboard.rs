//! Refresh orchestration: resolve location, fetch, aggregate, alert
//!
//! The only module in this crate that awaits collaborators. Errors from
//! them are returned unchanged and nothing is retried; a failed refresh
//! simply produces no new record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::alerts::{notify_alerts, DispatchReport};
use crate::forecast::aggregate;
use crate::pipeline::{AlertSink, Geocoder, WeatherSource};
use crate::types::{Coordinates, GeoLocation, WeatherData};
use crate::{DashboardError, DashboardResult};

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationQuery {
    /// Free-text place name
    Search(String),
    /// Coordinates reported by the device
    Device(Coordinates),
}

/// Result of a refresh: the new record plus what was sent to the sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Refresh {
    pub weather: WeatherData,
    pub dispatch: DispatchReport,
}

#[derive(Clone)]
pub struct Dashboard {
    geocoder: Arc<dyn Geocoder>,
    source: Arc<dyn WeatherSource>,
}

impl Dashboard {
    pub fn new(geocoder: Arc<dyn Geocoder>, source: Arc<dyn WeatherSource>) -> Self {
        Self { geocoder, source }
    }

    /// Resolve a query to a named location
    #[instrument(skip(self))]
    pub async fn resolve(&self, query: &LocationQuery) -> DashboardResult<GeoLocation> {
        match query {
            LocationQuery::Search(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(DashboardError::LocationNotFound(
                        "empty location query".to_string(),
                    ));
                }
                self.geocoder.search(text).await
            }
            LocationQuery::Device(coordinates) => self.geocoder.reverse(*coordinates).await,
        }
    }

    /// Fetch and aggregate a fresh record. `now` is converted into the
    /// location's own offset before the calendar-day split.
    #[instrument(skip(self))]
    pub async fn load(
        &self,
        query: &LocationQuery,
        now: DateTime<Utc>,
    ) -> DashboardResult<WeatherData> {
        let location = self.resolve(query).await?;
        let current = self.source.current(location.coordinates).await?;
        let samples = self.source.forecast(location.coordinates).await?;

        let local_now = now.with_timezone(current.observed_at.offset());
        let data = aggregate(&location.name, &current, &samples, local_now);

        info!(
            location = %data.location,
            days = data.forecast.len(),
            "Dashboard loaded"
        );
        Ok(data)
    }

    /// Load, then evaluate and deliver alerts to `sink`
    pub async fn refresh(
        &self,
        query: &LocationQuery,
        now: DateTime<Utc>,
        sink: &mut dyn AlertSink,
    ) -> DashboardResult<Refresh> {
        let weather = self.load(query, now).await?;
        let dispatch = notify_alerts(&weather, sink).await;
        Ok(Refresh { weather, dispatch })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::ConditionCode;
    use crate::types::{Alert, CurrentConditions, DayLabel, WeatherSample};
    use chrono::{DateTime, Duration, FixedOffset};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(ts: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(ts).unwrap()
    }

    struct FixedGeocoder;

    #[async_trait::async_trait]
    impl Geocoder for FixedGeocoder {
        async fn search(&self, query: &str) -> DashboardResult<GeoLocation> {
            if query == "Mumbai" {
                Ok(GeoLocation {
                    name: "Mumbai".into(),
                    coordinates: Coordinates::new(19.07, 72.88),
                })
            } else {
                Err(DashboardError::LocationNotFound(query.to_string()))
            }
        }

        async fn reverse(&self, coordinates: Coordinates) -> DashboardResult<GeoLocation> {
            Ok(GeoLocation {
                name: "Device".into(),
                coordinates,
            })
        }
    }

    #[derive(Default)]
    struct HotSource {
        forecast_calls: AtomicUsize,
        fail_forecast: bool,
    }

    #[async_trait::async_trait]
    impl WeatherSource for HotSource {
        async fn current(&self, _: Coordinates) -> DashboardResult<CurrentConditions> {
            Ok(CurrentConditions {
                observed_at: at("2024-06-03T10:00:00+05:30"),
                temperature: 36.2,
                feels_like: 40.0,
                temp_min: 29.0,
                temp_max: 38.0,
                description: "clear sky".into(),
                humidity: 40,
                wind_speed_kmh: 8.0,
                uv_index: None,
                cloud_cover: 0,
                rain: None,
                condition: ConditionCode::Clear,
                sunrise: at("2024-06-03T06:00:00+05:30"),
                sunset: at("2024-06-03T19:00:00+05:30"),
            })
        }

        async fn forecast(&self, _: Coordinates) -> DashboardResult<Vec<WeatherSample>> {
            self.forecast_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_forecast {
                return Err(DashboardError::FetchFailed("503".into()));
            }
            let start = at("2024-06-03T23:30:00+05:30");
            Ok((0..8)
                .map(|i| WeatherSample {
                    timestamp: start + Duration::hours(3 * i),
                    temperature: 25.0,
                    temp_min: None,
                    temp_max: None,
                    cloud_cover: 90,
                    precipitation_mm: Some(1.0),
                    condition: ConditionCode::Rain,
                })
                .collect())
        }
    }

    fn dashboard(source: HotSource) -> Dashboard {
        Dashboard::new(Arc::new(FixedGeocoder), Arc::new(source))
    }

    #[tokio::test]
    async fn test_load_uses_location_offset_for_today() {
        let board = dashboard(HotSource::default());
        // 18:30 UTC on the 3rd is already 00:00 on the 4th in +05:30
        let now: DateTime<Utc> = "2024-06-03T18:30:00Z".parse().unwrap();
        let data = board
            .load(&LocationQuery::Search("Mumbai".into()), now)
            .await
            .unwrap();

        assert_eq!(data.forecast[0].day, DayLabel::Today);
        assert_eq!(data.forecast[0].date.to_string(), "2024-06-04");
        // the 23:30 sample on the 3rd is now "yesterday" and forms its own bucket
        assert_eq!(data.forecast[1].date.to_string(), "2024-06-03");
    }

    #[tokio::test]
    async fn test_refresh_delivers_alerts() {
        let board = dashboard(HotSource::default());
        let now: DateTime<Utc> = "2024-06-03T04:30:00Z".parse().unwrap();
        let mut sink: Vec<Alert> = Vec::new();

        let refresh = board
            .refresh(&LocationQuery::Search(" Mumbai ".into()), now, &mut sink)
            .await
            .unwrap();

        assert_eq!(refresh.weather.location, "Mumbai");
        let titles: Vec<_> = sink.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["High Temperature Alert", "Rain Alert", "Temperature Drop Alert"]
        );
        assert_eq!(refresh.dispatch.delivered, sink);
    }

    #[tokio::test]
    async fn test_blank_query_is_not_found_without_lookup() {
        let board = dashboard(HotSource::default());
        let err = board
            .load(&LocationQuery::Search("   ".into()), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::LocationNotFound(_)));
    }

    #[tokio::test]
    async fn test_unknown_location_short_circuits() {
        let source = Arc::new(HotSource::default());
        let board = Dashboard::new(Arc::new(FixedGeocoder), source.clone());
        let err = board
            .load(&LocationQuery::Search("Atlantis".into()), Utc::now())
            .await
            .unwrap_err();

        assert_eq!(err, DashboardError::LocationNotFound("Atlantis".into()));
        assert_eq!(source.forecast_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_surfaces_unchanged() {
        let board = dashboard(HotSource {
            fail_forecast: true,
            ..Default::default()
        });
        let mut sink: Vec<Alert> = Vec::new();
        let err = board
            .refresh(&LocationQuery::Search("Mumbai".into()), Utc::now(), &mut sink)
            .await
            .unwrap_err();

        assert_eq!(err, DashboardError::FetchFailed("503".into()));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_device_location_uses_reverse_lookup() {
        let board = dashboard(HotSource::default());
        let now: DateTime<Utc> = "2024-06-03T04:30:00Z".parse().unwrap();
        let data = board
            .load(&LocationQuery::Device(Coordinates::new(18.5, 73.8)), now)
            .await
            .unwrap();
        assert_eq!(data.location, "Device");
    }
}

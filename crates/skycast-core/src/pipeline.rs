use anyhow::Result;

use crate::types::{Alert, Coordinates, CurrentConditions, GeoLocation, WeatherSample};
use crate::DashboardResult;

/// Resolves free text or device coordinates to a named location
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> DashboardResult<GeoLocation>;

    async fn reverse(&self, coordinates: Coordinates) -> DashboardResult<GeoLocation>;
}

/// Supplies current conditions and 3-hourly forecast samples
#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, coordinates: Coordinates) -> DashboardResult<CurrentConditions>;

    async fn forecast(&self, coordinates: Coordinates) -> DashboardResult<Vec<WeatherSample>>;
}

/// Receives alerts for display
#[async_trait::async_trait]
pub trait AlertSink: Send + Sync {
    async fn notify(&mut self, alert: &Alert) -> Result<()>;
}

/// Collects alerts in memory
#[async_trait::async_trait]
impl AlertSink for Vec<Alert> {
    async fn notify(&mut self, alert: &Alert) -> Result<()> {
        self.push(alert.clone());
        Ok(())
    }
}

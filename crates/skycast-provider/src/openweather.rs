//! OpenWeather REST client implementing the geocoding and weather-data traits

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use skycast_core::{
    Coordinates, CurrentConditions, DashboardError, DashboardResult, GeoLocation, Geocoder,
    WeatherSample, WeatherSource,
};
use tracing::{debug, instrument};
use url::Url;

use crate::models::{CurrentResponse, ForecastResponse, GeoEntry};
use crate::{ProviderError, ProviderResult};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const USER_AGENT: &str = concat!("skycast/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct OpenWeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenWeatherConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(config: OpenWeatherConfig) -> ProviderResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }
        let base_url = Url::parse(&config.base_url)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> DashboardResult<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| DashboardError::FetchFailed(format!("{}: {}", path, e)))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            query.append_pair("appid", &self.api_key);
        }
        Ok(url)
    }

    /// GET `path` and decode the body.
    ///
    /// Transport errors and non-2xx statuses are `FetchFailed`; a body that
    /// does not decode is `MalformedResponse`. The URL (which carries the
    /// API key) is kept out of error messages.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> DashboardResult<T> {
        let url = self.endpoint(path, params)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DashboardError::FetchFailed(format!("{}: {}", path, e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::FetchFailed(format!(
                "{} returned {}",
                path, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DashboardError::FetchFailed(format!("{}: {}", path, e.without_url())))?;
        debug!(path, bytes = body.len(), "Provider response received");

        serde_json::from_str(&body)
            .map_err(|e| DashboardError::MalformedResponse(format!("{}: {}", path, e)))
    }

    fn coordinate_params(coordinates: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("lat", coordinates.latitude.to_string()),
            ("lon", coordinates.longitude.to_string()),
        ]
    }
}

#[async_trait::async_trait]
impl Geocoder for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> DashboardResult<GeoLocation> {
        let params = [("q", query.to_string()), ("limit", "1".to_string())];
        let entries: Vec<GeoEntry> = self.get_json("/geo/1.0/direct", &params).await?;
        entries
            .into_iter()
            .next()
            .map(GeoLocation::from)
            .ok_or_else(|| DashboardError::LocationNotFound(query.to_string()))
    }

    #[instrument(skip(self))]
    async fn reverse(&self, coordinates: Coordinates) -> DashboardResult<GeoLocation> {
        let mut params = Self::coordinate_params(coordinates);
        params.push(("limit", "1".to_string()));
        let entries: Vec<GeoEntry> = self.get_json("/geo/1.0/reverse", &params).await?;
        entries
            .into_iter()
            .next()
            .map(|entry| GeoLocation {
                // keep the device's own fix rather than the place centroid
                name: entry.name,
                coordinates,
            })
            .ok_or_else(|| {
                DashboardError::LocationNotFound(format!(
                    "{:.4}, {:.4}",
                    coordinates.latitude, coordinates.longitude
                ))
            })
    }
}

#[async_trait::async_trait]
impl WeatherSource for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current(&self, coordinates: Coordinates) -> DashboardResult<CurrentConditions> {
        let mut params = Self::coordinate_params(coordinates);
        params.push(("units", "metric".to_string()));
        let resp: CurrentResponse = self.get_json("/data/2.5/weather", &params).await?;
        CurrentConditions::try_from(resp)
    }

    #[instrument(skip(self))]
    async fn forecast(&self, coordinates: Coordinates) -> DashboardResult<Vec<WeatherSample>> {
        let mut params = Self::coordinate_params(coordinates);
        params.push(("units", "metric".to_string()));
        let resp: ForecastResponse = self.get_json("/data/2.5/forecast", &params).await?;
        resp.into_samples()
    }
}

//! Weather-data and geocoding providers
//!
//! [`OpenWeatherClient`] talks to the OpenWeather REST API;
//! [`SimulatorProvider`] serves deterministic data for a handful of cities
//! so the dashboard can run without network access or an API key.

pub mod models;
pub mod openweather;
pub mod simulator;

pub use openweather::*;
pub use simulator::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Missing API key")]
    MissingApiKey,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

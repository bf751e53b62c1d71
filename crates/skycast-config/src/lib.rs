use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_HTTP_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_LOCATION: &str = "Mumbai, India";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenWeather,
    Simulator,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    pub kind: Option<ProviderKind>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardConfig {
    pub default_location: Option<String>,
    pub recent_locations: Option<Vec<String>>,
    pub alerts_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSinkConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SinksConfig {
    pub http: Option<HttpSinkConfig>,
    pub fs_dir: Option<String>,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub provider: Option<ProviderConfig>,
    pub dashboard: Option<DashboardConfig>,
    pub sinks: Option<SinksConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from SKYCAST_CONFIG path (TOML) if present, with reasonable defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SKYCAST_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from(path)
    }

    /// Load from an explicit path; a missing file yields defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg = if path.exists() {
            let s = fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    /// Get HTTP bind address (default 0.0.0.0:8080)
    pub fn http_bind(&self) -> String {
        self.sinks
            .as_ref()
            .and_then(|s| s.http.as_ref())
            .and_then(|h| h.bind.clone())
            .unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string())
    }

    pub fn fs_dir(&self) -> Option<String> {
        self.sinks.as_ref().and_then(|s| s.fs_dir.clone())
    }

    pub fn webhook_url(&self) -> Option<String> {
        self.sinks.as_ref().and_then(|s| s.webhook_url.clone())
    }

    /// Configured key, else OPENWEATHER_API_KEY from the environment
    pub fn api_key(&self) -> Option<String> {
        self.api_key_or(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_or(&self, fallback: Option<String>) -> Option<String> {
        self.provider
            .as_ref()
            .and_then(|p| p.api_key.clone())
            .or(fallback)
            .filter(|k| !k.trim().is_empty())
    }

    /// Explicit kind, else OpenWeather when a key is available
    pub fn provider_kind(&self) -> ProviderKind {
        self.provider_kind_with(self.api_key().is_some())
    }

    fn provider_kind_with(&self, has_key: bool) -> ProviderKind {
        match self.provider.as_ref().and_then(|p| p.kind) {
            Some(kind) => kind,
            None if has_key => ProviderKind::OpenWeather,
            None => ProviderKind::Simulator,
        }
    }

    pub fn base_url(&self) -> Option<String> {
        self.provider.as_ref().and_then(|p| p.base_url.clone())
    }

    pub fn timeout_secs(&self) -> u64 {
        self.provider
            .as_ref()
            .and_then(|p| p.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn default_location(&self) -> String {
        self.dashboard
            .as_ref()
            .and_then(|d| d.default_location.clone())
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string())
    }

    /// Seed list for the recent-locations menu
    pub fn recent_locations(&self) -> Vec<String> {
        self.dashboard
            .as_ref()
            .and_then(|d| d.recent_locations.clone())
            .unwrap_or_else(|| {
                ["Mumbai, India", "Pune, India", "Nagpur, India"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
    }

    pub fn alerts_enabled(&self) -> bool {
        self.dashboard
            .as_ref()
            .and_then(|d| d.alerts_enabled)
            .unwrap_or(true)
    }
}

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use skycast_config::{AppConfig, ProviderKind};
use skycast_core::{Dashboard, LocationQuery};
use skycast_provider::{OpenWeatherClient, OpenWeatherConfig, SimulatorProvider};
use skycast_sinks::{FanoutSink, FsSink, LogSink};
use tokio::net::TcpListener;

fn build_dashboard(cfg: &AppConfig) -> Result<Dashboard> {
    match cfg.provider_kind() {
        ProviderKind::OpenWeather => {
            let mut ow = OpenWeatherConfig::new(cfg.api_key().unwrap_or_default());
            if let Some(base_url) = cfg.base_url() {
                ow.base_url = base_url;
            }
            ow.timeout = Duration::from_secs(cfg.timeout_secs());
            let client = Arc::new(OpenWeatherClient::new(ow).context("openweather provider")?);
            tracing::info!("Using OpenWeather provider");
            Ok(Dashboard::new(client.clone(), client))
        }
        ProviderKind::Simulator => {
            let sim = Arc::new(SimulatorProvider::new());
            tracing::info!("Using simulated provider");
            Ok(Dashboard::new(sim.clone(), sim))
        }
    }
}

fn build_sinks(cfg: &AppConfig) -> FanoutSink {
    let mut sinks = FanoutSink::new().with(LogSink);

    if let Some(dir) = cfg.fs_dir() {
        match FsSink::new(&dir) {
            Ok(sink) => sinks.push(Box::new(sink)),
            Err(e) => tracing::warn!(error=?e, %dir, "fs sink disabled"),
        }
    }

    if let Some(url) = cfg.webhook_url() {
        #[cfg(feature = "webhook")]
        {
            match skycast_sinks::webhook::WebhookSink::new(url) {
                Ok(sink) => sinks.push(Box::new(sink)),
                Err(e) => tracing::warn!(error=?e, "webhook sink disabled"),
            }
        }
        #[cfg(not(feature = "webhook"))]
        {
            tracing::warn!(%url, "webhook_url set but built without the webhook feature");
        }
    }

    sinks
}

#[tokio::main]
async fn main() -> Result<()> {
    // Observability
    skycast_obs::init("skycast");

    // Config
    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error=%e, "config unreadable, using defaults");
            AppConfig::default()
        }
    };

    let dashboard = build_dashboard(&cfg)?;
    let options = skycast_cli::AppOptions {
        recent_locations: cfg.recent_locations(),
        alerts_enabled: cfg.alerts_enabled(),
    };
    let (app, state) = skycast_cli::build_app(dashboard, Box::new(build_sinks(&cfg)), options)?;

    // Warm the latest record with the default location
    let warm_state = state.clone();
    let default_location = cfg.default_location();
    tokio::spawn(async move {
        if let Err(e) =
            skycast_cli::refresh(&warm_state, LocationQuery::Search(default_location)).await
        {
            tracing::warn!(error=%e, "initial refresh failed");
        }
    });

    // Start HTTP server
    let addr: SocketAddr = cfg
        .http_bind()
        .parse()
        .context("invalid HTTP bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;

    // Mark ready just before serving
    skycast_cli::set_ready(&state, true);

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

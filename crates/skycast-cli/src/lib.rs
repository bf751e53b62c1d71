pub mod recent;

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::{Deserialize, Serialize};
use skycast_core::{
    evaluate_alerts, notify_alerts, rainfall_outlook, uv_label, Alert, AlertSink, Coordinates,
    Dashboard, DashboardError, LocationQuery, WeatherData,
};
use tokio::sync::Mutex;

use crate::recent::RecentLocations;

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    alerts_total: Counter<u64>,
    fetch_failures_total: Counter<u64>,
    dashboard: Dashboard,
    sink: Mutex<Box<dyn AlertSink>>,
    alerts_enabled: AtomicBool,
    next_ticket: AtomicU64,
    latest: Mutex<Option<Snapshot>>,
    recent: Mutex<RecentLocations>,
}

/// Latest stored record and the ticket of the request that produced it
struct Snapshot {
    ticket: u64,
    weather: WeatherData,
}

/// Startup values taken from configuration
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub recent_locations: Vec<String>,
    pub alerts_enabled: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            recent_locations: Vec::new(),
            alerts_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub weather: WeatherData,
    pub alerts: Vec<Alert>,
}

/// Secondary readings shown beside the main card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDetails {
    pub feels_like: i32,
    pub humidity: u8,
    pub wind_speed: i32,
    pub uv_index: u8,
    pub uv_label: String,
    pub sunrise: String,
    pub sunset: String,
}

impl From<&WeatherData> for WeatherDetails {
    fn from(data: &WeatherData) -> Self {
        Self {
            feels_like: data.feels_like,
            humidity: data.humidity,
            wind_speed: data.wind_speed,
            uv_index: data.uv_index,
            uv_label: uv_label(data.uv_index),
            sunrise: data.sunrise.clone(),
            sunset: data.sunset.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSettings {
    pub enabled: bool,
}

pub fn build_app(
    dashboard: Dashboard,
    sink: Box<dyn AlertSink>,
    options: AppOptions,
) -> Result<(Router, Arc<AppState>)> {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter().with_registry(registry.clone()).build()?;
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("skycast-cli");

    let requests_total = meter
        .u64_counter("skycast_requests_total")
        .with_description("Total HTTP requests served")
        .init();
    let alerts_total = meter
        .u64_counter("skycast_alerts_total")
        .with_description("Alerts raised by dashboard refreshes")
        .init();
    let fetch_failures_total = meter
        .u64_counter("skycast_fetch_failures_total")
        .with_description("Refreshes that failed at the provider")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        alerts_total,
        fetch_failures_total,
        dashboard,
        sink: Mutex::new(sink),
        alerts_enabled: AtomicBool::new(options.alerts_enabled),
        next_ticket: AtomicU64::new(0),
        latest: Mutex::new(None),
        recent: Mutex::new(RecentLocations::new(options.recent_locations)),
    });

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/weather", get(weather))
        .route("/api/v1/current", get(current))
        .route("/api/v1/alerts", get(alerts))
        .route("/api/v1/rainfall", get(rainfall))
        .route("/api/v1/details", get(details))
        .route("/api/v1/locations/recent", get(recent_locations))
        .route(
            "/api/v1/settings/alerts",
            get(alert_settings).put(update_alert_settings),
        )
        .with_state(Arc::clone(&state));

    Ok((router, state))
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

/// Issue the ticket for a new refresh; later tickets are larger
pub fn take_ticket(state: &Arc<AppState>) -> u64 {
    state.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
}

/// Store `weather` unless a newer request has already stored its result
pub async fn store_if_newer(state: &Arc<AppState>, ticket: u64, weather: WeatherData) -> bool {
    let mut latest = state.latest.lock().await;
    if latest.as_ref().is_some_and(|s| s.ticket > ticket) {
        tracing::debug!(ticket, "Discarding stale refresh result");
        return false;
    }
    *latest = Some(Snapshot { ticket, weather });
    true
}

pub async fn latest_weather(state: &Arc<AppState>) -> Option<WeatherData> {
    state.latest.lock().await.as_ref().map(|s| s.weather.clone())
}

/// Load a fresh record and, if it is still the newest, store it, remember
/// the location and deliver its alerts.
///
/// A superseded result is returned to the caller but has no other effect.
/// On failure the stored record is left untouched.
pub async fn refresh(
    state: &Arc<AppState>,
    query: LocationQuery,
) -> Result<WeatherResponse, DashboardError> {
    let ticket = take_ticket(state);

    let weather = match state.dashboard.load(&query, Utc::now()).await {
        Ok(weather) => weather,
        Err(e) => {
            if !matches!(e, DashboardError::LocationNotFound(_)) {
                state.fetch_failures_total.add(1, &[]);
            }
            tracing::warn!(error = %e, ticket, "Refresh failed");
            return Err(e);
        }
    };

    let alerts = evaluate_alerts(&weather);

    // a newer request already stored its record; answer the caller only
    if !store_if_newer(state, ticket, weather.clone()).await {
        return Ok(WeatherResponse { weather, alerts });
    }

    state.alerts_total.add(alerts.len() as u64, &[]);

    {
        let mut recent = state.recent.lock().await;
        match &query {
            LocationQuery::Search(text) => recent.record(text),
            LocationQuery::Device(_) => recent.record(&weather.location),
        }
    }

    if state.alerts_enabled.load(Ordering::Relaxed) {
        let mut sink = state.sink.lock().await;
        let report = notify_alerts(&weather, &mut **sink).await;
        if !report.is_complete() {
            tracing::warn!(failed = report.failed.len(), "Some alerts were not delivered");
        }
    }

    Ok(WeatherResponse { weather, alerts })
}

#[derive(Debug)]
pub enum ApiError {
    BadQuery(String),
    Dashboard(DashboardError),
}

impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        ApiError::Dashboard(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadQuery(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Dashboard(e) => {
                let status = match e {
                    DashboardError::LocationNotFound(_) => StatusCode::NOT_FOUND,
                    DashboardError::FetchFailed(_) | DashboardError::MalformedResponse(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                };
                (status, e.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    state.requests_total.add(1, &[]);
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(state): State<Arc<AppState>>,
) -> (
    [(axum::http::header::HeaderName, axum::http::HeaderValue); 1],
    String,
) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error=?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

#[derive(Debug, Deserialize)]
struct WeatherParams {
    q: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl WeatherParams {
    fn into_query(self) -> Result<LocationQuery, ApiError> {
        match (self.q, self.lat, self.lon) {
            (Some(q), None, None) => Ok(LocationQuery::Search(q)),
            (None, Some(lat), Some(lon))
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) =>
            {
                Ok(LocationQuery::Device(Coordinates::new(lat, lon)))
            }
            (None, Some(_), Some(_)) => Err(ApiError::BadQuery(
                "coordinates out of range".to_string(),
            )),
            _ => Err(ApiError::BadQuery(
                "expected either q or both lat and lon".to_string(),
            )),
        }
    }
}

async fn weather(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<WeatherResponse>, ApiError> {
    state.requests_total.add(1, &[]);
    let query = params.into_query()?;
    let response = refresh(&state, query).await?;
    Ok(Json(response))
}

async fn current(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.requests_total.add(1, &[]);
    match latest_weather(&state).await {
        Some(data) => (StatusCode::OK, Json(data)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn alerts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.requests_total.add(1, &[]);
    let alerts = latest_weather(&state)
        .await
        .map(|data| evaluate_alerts(&data))
        .unwrap_or_default();
    (StatusCode::OK, Json(alerts)).into_response()
}

async fn rainfall(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.requests_total.add(1, &[]);
    match latest_weather(&state).await {
        Some(data) => (StatusCode::OK, Json(rainfall_outlook(&data))).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn details(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.requests_total.add(1, &[]);
    match latest_weather(&state).await {
        Some(data) => (StatusCode::OK, Json(WeatherDetails::from(&data))).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn recent_locations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.requests_total.add(1, &[]);
    let recent = state.recent.lock().await;
    (StatusCode::OK, Json(recent.clone())).into_response()
}

async fn alert_settings(State(state): State<Arc<AppState>>) -> Json<AlertSettings> {
    Json(AlertSettings {
        enabled: state.alerts_enabled.load(Ordering::Relaxed),
    })
}

async fn update_alert_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<AlertSettings>,
) -> Json<AlertSettings> {
    state.requests_total.add(1, &[]);
    state
        .alerts_enabled
        .store(settings.enabled, Ordering::Relaxed);
    tracing::info!(enabled = settings.enabled, "Alert delivery toggled");
    Json(settings)
}

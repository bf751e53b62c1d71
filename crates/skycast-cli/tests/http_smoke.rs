use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use skycast_core::{Alert, Dashboard};
use skycast_provider::SimulatorProvider;
use tower::ServiceExt;

fn app() -> (axum::Router, Arc<skycast_cli::AppState>) {
    let sim = Arc::new(SimulatorProvider::new());
    skycast_cli::build_app(
        Dashboard::new(sim.clone(), sim),
        Box::new(Vec::<Alert>::new()),
        skycast_cli::AppOptions::default(),
    )
    .unwrap()
}

async fn get(app: &axum::Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn health_ready_metrics_endpoints() {
    let (app, state) = app();

    // /healthz returns 200 and increments a counter
    assert_eq!(get(&app, "/healthz").await.status(), StatusCode::OK);

    // /readyz initially 503
    assert_eq!(
        get(&app, "/readyz").await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );

    skycast_cli::set_ready(&state, true);
    assert_eq!(get(&app, "/readyz").await.status(), StatusCode::OK);

    // /metrics returns prometheus text and contains our counter
    let res = get(&app, "/metrics").await;
    assert_eq!(res.status(), StatusCode::OK);
    let ct = res.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(ct.starts_with("text/plain"));
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("skycast_requests_total"));
}

#[tokio::test]
async fn simulated_refresh_is_served() {
    let (app, _state) = app();

    let res = get(&app, "/api/v1/weather?q=Pune").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["weather"]["location"], "Pune");
    assert_eq!(json["weather"]["forecast"][0]["day"], "Today");
    let days = json["weather"]["forecast"].as_array().unwrap().len();
    assert!((1..=6).contains(&days));
    assert!(json["alerts"].is_array());
}

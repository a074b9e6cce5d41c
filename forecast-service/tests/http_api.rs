mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::{engine_with, hourly_readings, CountingSource};
use forecast_service::api::{self, identity::USER_ID_HEADER, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;
use time::macros::datetime;
use tower::ServiceExt;
use uuid::Uuid;

struct Harness {
    app: Router,
    source: Arc<CountingSource>,
    user: Uuid,
    _dir: tempfile::TempDir,
}

fn harness(readings_for_user: bool) -> Harness {
    let user = Uuid::new_v4();
    let readings = if readings_for_user {
        hourly_readings(user, datetime!(2024-01-05 03:00:00 UTC), 100, 1000.0)
    } else {
        vec![]
    };
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("prophet_wind.json"), "not an artifact").unwrap();
    let source = CountingSource::new(readings);
    let (engine, _) = engine_with(source.clone(), dir.path());

    Harness {
        app: api::router(AppState::new(engine, 2)),
        source,
        user,
        _dir: dir,
    }
}

async fn get(h: &Harness, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .uri(uri)
        .header(USER_ID_HEADER, h.user.to_string())
        .body(Body::empty())
        .unwrap();
    let res = h.app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

#[tokio::test]
async fn forecast_returns_timestamp_value_pairs() {
    let h = harness(true);
    let (status, body) = get(&h, "/forecast/Demand?horizon=3&model=hw").await;

    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0][0], "2024-01-05T04:00:00");
    assert_eq!(points[2][0], "2024-01-05T06:00:00");
    assert!(points[0][1].as_f64().unwrap().is_finite());
}

#[tokio::test]
async fn default_horizon_is_48() {
    let h = harness(true);
    let (status, body) = get(&h, "/forecast/solar").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 48);
}

#[tokio::test]
async fn unknown_metric_is_400_without_loading() {
    let h = harness(true);
    let (status, body) = get(&h, "/forecast/plutonium").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("plutonium"));
    assert!(detail.contains("small-hydro"));
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn out_of_range_horizon_is_400() {
    let h = harness(true);
    for uri in ["/forecast/solar?horizon=0", "/forecast/solar?horizon=337"] {
        let (status, _) = get(&h, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn unknown_model_is_400() {
    let h = harness(true);
    let (status, _) = get(&h, "/forecast/solar?model=arima").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_history_is_404() {
    let h = harness(false);
    let (status, body) = get(&h, "/forecast/demand").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("no historical data"));
}

#[tokio::test]
async fn boosting_is_501() {
    let h = harness(true);
    let (status, body) = get(&h, "/forecast/demand?model=xgb").await;

    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert!(body["detail"].as_str().unwrap().contains("not implemented"));
}

#[tokio::test]
async fn corrupt_artifact_is_500_with_generic_message() {
    let h = harness(true);
    let (status, body) = get(&h, "/forecast/wind?model=pretrained").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Internal server error");
}

#[tokio::test]
async fn missing_user_header_is_401() {
    let h = harness(true);
    let req = Request::builder()
        .uri("/forecast/demand")
        .body(Body::empty())
        .unwrap();
    let res = h.app.clone().oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn health_is_ok() {
    let h = harness(false);
    let (status, body) = get(&h, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

//! HTTP surface: `GET /forecast/:metric` and a health probe.

pub mod error;
pub mod forecast;
pub mod identity;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use tokio::sync::Semaphore;

use crate::forecast::ForecastEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ForecastEngine>,
    /// Caps forecasts running at once; fitting is CPU-bound.
    pub fit_permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(engine: Arc<ForecastEngine>, max_concurrent_fits: usize) -> Self {
        Self {
            engine,
            fit_permits: Arc::new(Semaphore::new(max_concurrent_fits.max(1))),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/forecast/:metric", get(forecast::forecast_metric))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

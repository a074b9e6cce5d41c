#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use energy_client::{
    db::reading_queries::MetricSample,
    domain::{Metric, Reading},
};
use forecast_service::forecast::{
    ForecastEngine, FsArtifactStore, InMemorySeriesSource, ModelRegistry, SeriesSource,
};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Counts loader calls so tests can prove a request never reached storage.
pub struct CountingSource {
    inner: InMemorySeriesSource,
    calls: AtomicUsize,
}

impl CountingSource {
    pub fn new(readings: Vec<Reading>) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemorySeriesSource::new(readings),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SeriesSource for CountingSource {
    async fn metric_series(&self, user_id: Uuid, metric: Metric) -> anyhow::Result<Vec<MetricSample>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.metric_series(user_id, metric).await
    }
}

/// `count` hourly readings ending at `last`, every quantity rising gently
/// from `base_kwh`.
pub fn hourly_readings(user_id: Uuid, last: OffsetDateTime, count: usize, base_kwh: f64) -> Vec<Reading> {
    (0..count)
        .map(|i| {
            let ts = last - Duration::hours((count - 1 - i) as i64);
            let wave = 50.0 * ((i as f64) * std::f64::consts::PI / 12.0).sin();
            let kwh = base_kwh + 10.0 * i as f64 + wave;
            Reading {
                user_id,
                ts,
                consumption_kwh: kwh,
                production_kwh: kwh * 0.8,
                nuclear_kwh: kwh * 0.3,
                wind_kwh: kwh * 0.2,
                hydroelectric_kwh: kwh * 0.1,
                oil_and_gas_kwh: kwh * 0.15,
                coal_kwh: kwh * 0.05,
                solar_kwh: kwh * 0.25,
                biomass_kwh: kwh * 0.05,
            }
        })
        .collect()
}

pub fn engine_with(source: Arc<dyn SeriesSource>, model_dir: &std::path::Path) -> (Arc<ForecastEngine>, Arc<ModelRegistry>) {
    let registry = Arc::new(ModelRegistry::new(Arc::new(FsArtifactStore::new(model_dir))));
    let engine = Arc::new(ForecastEngine::new(source, registry.clone()));
    (engine, registry)
}

pub const LINEAR_ARTIFACT: &str = r#"{
    "history_start": "2023-12-01T00:00:00Z",
    "history_end": "2023-12-31T00:00:00Z",
    "freq_secs": 3600,
    "y_scale": 4.0,
    "trend": {
        "k": 0.3,
        "m": 0.5,
        "changepoints": [{ "t": 0.5, "delta": -0.1 }]
    },
    "seasonalities": [
        { "name": "daily", "period_days": 1.0, "fourier_order": 1, "beta": [0.05, -0.02] }
    ]
}"#;

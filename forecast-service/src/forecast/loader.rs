use energy_client::{
    db::reading_queries::{self, MetricSample},
    domain::{Metric, Reading},
};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::forecast::error::ForecastError;

pub const KWH_PER_MWH: f64 = 1000.0;

/// Where historical readings come from.
///
/// Implementations return kWh samples in ascending timestamp order.
#[async_trait::async_trait]
pub trait SeriesSource: Send + Sync {
    async fn metric_series(&self, user_id: Uuid, metric: Metric) -> anyhow::Result<Vec<MetricSample>>;
}

/// Reads from the `energy_readings` table.
#[derive(Clone)]
pub struct PgSeriesSource {
    pool: PgPool,
}

impl PgSeriesSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SeriesSource for PgSeriesSource {
    async fn metric_series(&self, user_id: Uuid, metric: Metric) -> anyhow::Result<Vec<MetricSample>> {
        reading_queries::metric_series(&self.pool, user_id, metric).await
    }
}

/// A caller-supplied reading set, e.g. an uploaded file or a test fixture.
#[derive(Debug, Clone, Default)]
pub struct InMemorySeriesSource {
    readings: Vec<Reading>,
}

impl InMemorySeriesSource {
    pub fn new(mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|r| r.ts);
        Self { readings }
    }
}

#[async_trait::async_trait]
impl SeriesSource for InMemorySeriesSource {
    async fn metric_series(&self, user_id: Uuid, metric: Metric) -> anyhow::Result<Vec<MetricSample>> {
        Ok(self
            .readings
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| MetricSample {
                ts: r.ts,
                kwh: metric.value_of(r),
            })
            .collect())
    }
}

/// A non-empty, time-ordered history of one metric in MWh.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSeries {
    timestamps: Vec<OffsetDateTime>,
    values: Vec<f64>,
}

impl HistoricalSeries {
    /// Convert kWh samples to an MWh series. Empty input is `NoData`.
    pub fn from_samples(metric: Metric, samples: Vec<MetricSample>) -> Result<Self, ForecastError> {
        if samples.is_empty() {
            return Err(ForecastError::NoData { metric });
        }

        let (timestamps, values): (Vec<_>, Vec<_>) = samples
            .into_iter()
            .map(|s| (s.ts, s.kwh / KWH_PER_MWH))
            .unzip();

        Ok(Self {
            timestamps,
            values,
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn last_timestamp(&self) -> OffsetDateTime {
        // Non-empty by construction.
        self.timestamps[self.timestamps.len() - 1]
    }
}

/// Load one metric's history for a user.
pub async fn load_series(
    source: &dyn SeriesSource,
    user_id: Uuid,
    metric: Metric,
) -> Result<HistoricalSeries, ForecastError> {
    let samples = source
        .metric_series(user_id, metric)
        .await
        .map_err(ForecastError::Source)?;

    tracing::debug!(%user_id, %metric, points = samples.len(), "historical series loaded");
    HistoricalSeries::from_samples(metric, samples)
}

use std::{sync::Arc, time::Instant};

use serde::{ser::Error as _, Serialize, Serializer};
use time::{macros::format_description, Duration, OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::forecast::{
    error::{ArtifactError, ForecastError},
    loader::{load_series, HistoricalSeries, SeriesSource},
    registry::ModelRegistry,
    request::{ForecastRequest, ModelKind},
    smoothing::{HoltLinear, SmoothingError},
};

/// Spacing between forecast periods.
pub const PERIOD: Duration = Duration::HOUR;

/// One forecast period: timestamp and value in MWh rounded to 2 decimals.
///
/// Serializes as `["YYYY-MM-DDTHH:MM:SS", value]` with the timestamp in UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub timestamp: OffsetDateTime,
    pub value: f64,
}

impl ForecastPoint {
    pub fn timestamp_string(&self) -> Result<String, time::error::Format> {
        self.timestamp
            .to_offset(UtcOffset::UTC)
            .format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
    }
}

impl Serialize for ForecastPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ts = self.timestamp_string().map_err(S::Error::custom)?;
        (ts, self.value).serialize(serializer)
    }
}

/// Round half to even at 2 decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// `horizon` timestamps one period apart, the first one period after `last`.
pub fn future_timestamps(last: OffsetDateTime, horizon: usize) -> Vec<OffsetDateTime> {
    (1..=horizon as i32).map(|i| last + PERIOD * i).collect()
}

/// Strategies that can actually produce numbers.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    Smoothing,
    Pretrained,
}

/// Turns a validated request into forecast points.
///
/// Holds no per-request state; the registry's artifact cache is the only
/// thing shared between calls.
pub struct ForecastEngine {
    source: Arc<dyn SeriesSource>,
    registry: Arc<ModelRegistry>,
}

impl ForecastEngine {
    pub fn new(source: Arc<dyn SeriesSource>, registry: Arc<ModelRegistry>) -> Self {
        Self { source, registry }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub async fn forecast(
        &self,
        user_id: Uuid,
        request: &ForecastRequest,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let res = self.run(user_id, request).await;
        if let Err(e) = &res {
            metrics::counter!("forecast_errors_total", "kind" => e.kind()).increment(1);
            if e.is_internal() {
                tracing::error!(
                    error = %e,
                    metric = %request.metric,
                    model = %request.model,
                    "forecast failed"
                );
            }
        }
        res
    }

    async fn run(&self, user_id: Uuid, request: &ForecastRequest) -> Result<Vec<ForecastPoint>, ForecastError> {
        let ForecastRequest {
            metric,
            horizon,
            model,
        } = *request;

        // Unbuilt kinds fail before touching storage.
        let strategy = match model {
            ModelKind::Smoothing => Strategy::Smoothing,
            ModelKind::Pretrained => Strategy::Pretrained,
            ModelKind::BoostingA | ModelKind::BoostingB => {
                return Err(ForecastError::NotImplemented { model });
            }
        };

        metrics::counter!("forecast_requests_total", "model" => model.as_str()).increment(1);
        let series = load_series(self.source.as_ref(), user_id, metric).await?;

        let raw = match strategy {
            Strategy::Smoothing => smoothing_forecast(&series, horizon.get())?,
            Strategy::Pretrained => match self.registry.pretrained(metric).await {
                Ok(artifact) => artifact.predict(horizon.get()),
                Err(ArtifactError::NotFound { .. }) => {
                    metrics::counter!("forecast_fallback_total", "metric" => metric.as_str()).increment(1);
                    tracing::info!(%metric, "no pre-trained artifact, falling back to smoothing");
                    smoothing_forecast(&series, horizon.get())?
                }
                Err(e) => return Err(ForecastError::Artifact(e)),
            },
        };

        let points: Vec<ForecastPoint> = future_timestamps(series.last_timestamp(), horizon.get())
            .into_iter()
            .zip(raw)
            .map(|(timestamp, value)| ForecastPoint {
                timestamp,
                value: round2(value),
            })
            .collect();

        tracing::debug!(
            %metric,
            %model,
            horizon = horizon.get(),
            history = series.values().len(),
            "forecast produced"
        );
        Ok(points)
    }
}

fn smoothing_forecast(series: &HistoricalSeries, horizon: usize) -> Result<Vec<f64>, ForecastError> {
    let started = Instant::now();
    let fit_error = |e: SmoothingError| ForecastError::Fit {
        model: ModelKind::Smoothing,
        reason: e.to_string(),
    };
    let fitted = HoltLinear::fit(series.values()).map_err(fit_error)?;
    metrics::histogram!("forecast_fit_seconds", "model" => ModelKind::Smoothing.as_str())
        .record(started.elapsed().as_secs_f64());
    fitted.forecast(horizon).map_err(fit_error)
}

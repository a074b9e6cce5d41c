use std::path::PathBuf;

use energy_client::domain::{Metric, UnknownMetric};

use crate::forecast::request::{Horizon, ModelKind};

/// Failures while obtaining a pre-trained artifact.
///
/// `NotFound` is the expected "no artifact for this metric" signal and is
/// recovered by the engine. The other variants are real faults.
#[derive(thiserror::Error, Debug)]
pub enum ArtifactError {
    #[error("no pre-trained artifact for metric '{metric}'")]
    NotFound { metric: Metric },
    #[error("failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt artifact for metric '{metric}': {reason}")]
    Corrupt { metric: Metric, reason: String },
}

#[derive(thiserror::Error, Debug)]
pub enum ForecastError {
    #[error(transparent)]
    UnknownMetric(#[from] UnknownMetric),
    #[error("horizon must be between {} and {}, got {given}", Horizon::MIN, Horizon::MAX)]
    InvalidHorizon { given: i64 },
    #[error("unknown model '{given}'; allowed: smoothing, pretrained, boosting-a, boosting-b")]
    UnknownModel { given: String },
    #[error("no historical data for metric '{metric}'")]
    NoData { metric: Metric },
    #[error("model '{model}' is not implemented yet")]
    NotImplemented { model: ModelKind },
    #[error("model artifact error: {0}")]
    Artifact(ArtifactError),
    #[error("failed to fit {model} model: {reason}")]
    Fit { model: ModelKind, reason: String },
    #[error("failed to load series: {0:#}")]
    Source(anyhow::Error),
}

impl ForecastError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ForecastError::UnknownMetric(_) => "unknown_metric",
            ForecastError::InvalidHorizon { .. } => "invalid_horizon",
            ForecastError::UnknownModel { .. } => "unknown_model",
            ForecastError::NoData { .. } => "no_data",
            ForecastError::NotImplemented { .. } => "not_implemented",
            ForecastError::Artifact(_) => "artifact",
            ForecastError::Fit { .. } => "fit",
            ForecastError::Source(_) => "source",
        }
    }

    /// Faults on our side rather than in the request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ForecastError::Artifact(_) | ForecastError::Fit { .. } | ForecastError::Source(_)
        )
    }
}

//! Additive-trend exponential smoothing (Holt's linear method, ETS `AAN`).
//!
//! Series long enough to estimate are fit with `augurs`' ETS, which chooses
//! the smoothing weights and the initial level and trend by likelihood.
//! Shorter series run the plain recursions with fixed weights:
//!
//! - Level: `l_t = α·y_t + (1-α)·(l_{t-1} + b_{t-1})`
//! - Trend: `b_t = β·(l_t - l_{t-1}) + (1-β)·b_{t-1}`
//! - Forecast: `ŷ_{t+h} = l_t + h·b_t`

use augurs::{
    ets::{AutoETS, FittedAutoETS},
    prelude::*,
};

/// Non-seasonal, additive error, additive trend.
const ETS_SPEC: &str = "AAN";
/// Shortest series handed to the ETS estimator.
pub const MIN_ETS_POINTS: usize = 10;

const SHORT_ALPHA: f64 = 0.3;
const SHORT_BETA: f64 = 0.1;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SmoothingError {
    #[error("cannot fit an empty series")]
    Empty,
    #[error("series contains a non-finite value at index {0}")]
    NonFinite(usize),
    #[error("ETS {stage} failed: {reason}")]
    Ets { stage: &'static str, reason: String },
    #[error("model produced a non-finite forecast at step {0}")]
    NonFiniteForecast(usize),
}

enum Fitted {
    Ets(Box<FittedAutoETS>),
    Fixed { level: f64, trend: f64 },
}

/// A fitted Holt model ready to extrapolate.
pub struct HoltLinear {
    fitted: Fitted,
}

impl HoltLinear {
    pub fn fit(values: &[f64]) -> Result<Self, SmoothingError> {
        check(values)?;

        // Too short to estimate, or nothing to estimate.
        if values.len() < MIN_ETS_POINTS || is_constant(values) {
            return Self::with_params(values, SHORT_ALPHA, SHORT_BETA);
        }

        let auto = AutoETS::new(1, ETS_SPEC).map_err(|e| SmoothingError::Ets {
            stage: "init",
            reason: e.to_string(),
        })?;
        let fitted = auto.fit(values).map_err(|e| SmoothingError::Ets {
            stage: "fit",
            reason: e.to_string(),
        })?;

        tracing::debug!(points = values.len(), spec = ETS_SPEC, "ETS model fitted");
        Ok(Self {
            fitted: Fitted::Ets(Box::new(fitted)),
        })
    }

    /// Run the recursions with fixed weights, starting from the first
    /// observation and the first difference.
    pub fn with_params(values: &[f64], alpha: f64, beta: f64) -> Result<Self, SmoothingError> {
        check(values)?;

        let (mut level, mut trend) = match values {
            [first, second, ..] => (*first, second - first),
            [only] => (*only, 0.0),
            [] => return Err(SmoothingError::Empty),
        };
        for &y in &values[1..] {
            let next_level = alpha * y + (1.0 - alpha) * (level + trend);
            trend = beta * (next_level - level) + (1.0 - beta) * trend;
            level = next_level;
        }

        Ok(Self {
            fitted: Fitted::Fixed { level, trend },
        })
    }

    /// Point forecasts for steps `1..=horizon`.
    pub fn forecast(&self, horizon: usize) -> Result<Vec<f64>, SmoothingError> {
        let point = match &self.fitted {
            Fitted::Ets(model) => {
                model
                    .predict(horizon, None)
                    .map_err(|e| SmoothingError::Ets {
                        stage: "predict",
                        reason: e.to_string(),
                    })?
                    .point
            }
            Fitted::Fixed { level, trend } => (1..=horizon).map(|h| level + h as f64 * trend).collect(),
        };

        if let Some(idx) = point.iter().position(|v| !v.is_finite()) {
            return Err(SmoothingError::NonFiniteForecast(idx));
        }
        Ok(point)
    }
}

fn check(values: &[f64]) -> Result<(), SmoothingError> {
    if values.is_empty() {
        return Err(SmoothingError::Empty);
    }
    if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
        return Err(SmoothingError::NonFinite(idx));
    }
    Ok(())
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

//! Serialized, previously fit forecasting models.
//!
//! An artifact is a decomposable additive model: a piecewise-linear trend in
//! scaled time plus Fourier seasonalities, all multiplied by `y_scale`.
//! Time is scaled so that `history_start` maps to 0 and `history_end` to 1.
//! Predictions run over the periods immediately after `history_end` and never
//! look at live readings.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::forecast::request::Horizon;

const SECONDS_PER_DAY: f64 = 86_400.0;
/// Coarsest period step an artifact may declare.
const MAX_FREQ_SECS: i64 = 366 * 86_400;

fn default_freq_secs() -> i64 {
    3600
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Changepoint {
    /// Position in scaled time.
    pub t: f64,
    /// Change in growth rate from this point on.
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    /// Base growth rate.
    pub k: f64,
    /// Offset.
    pub m: f64,
    #[serde(default)]
    pub changepoints: Vec<Changepoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub name: String,
    pub period_days: f64,
    pub fourier_order: usize,
    /// Interleaved `[sin_1, cos_1, sin_2, cos_2, ...]` coefficients.
    pub beta: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PretrainedModel {
    #[serde(with = "time::serde::rfc3339")]
    pub history_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub history_end: OffsetDateTime,
    #[serde(default = "default_freq_secs")]
    pub freq_secs: i64,
    pub y_scale: f64,
    pub trend: Trend,
    #[serde(default)]
    pub seasonalities: Vec<Seasonality>,
}

impl PretrainedModel {
    /// Parse and sanity-check a JSON artifact.
    pub fn from_json(bytes: &[u8]) -> Result<Self, String> {
        let model: PretrainedModel = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), String> {
        if self.history_end <= self.history_start {
            return Err("history_end must be after history_start".to_string());
        }
        if self.freq_secs <= 0 || self.freq_secs > MAX_FREQ_SECS {
            return Err(format!(
                "freq_secs must be in 1..={MAX_FREQ_SECS}, got {}",
                self.freq_secs
            ));
        }
        let last_step = Duration::seconds(self.freq_secs)
            .checked_mul(Horizon::MAX as i32)
            .and_then(|span| self.history_end.checked_add(span));
        if last_step.is_none() {
            return Err("forecast window runs past the representable date range".to_string());
        }
        if !self.y_scale.is_finite() || !self.trend.k.is_finite() || !self.trend.m.is_finite() {
            return Err("trend parameters and y_scale must be finite".to_string());
        }
        if self
            .trend
            .changepoints
            .iter()
            .any(|c| !c.t.is_finite() || !c.delta.is_finite())
        {
            return Err("changepoints must be finite".to_string());
        }
        for s in &self.seasonalities {
            if !s.period_days.is_finite() || s.period_days <= 0.0 {
                return Err(format!("seasonality '{}' has non-positive period", s.name));
            }
            if s.beta.len() != 2 * s.fourier_order {
                return Err(format!(
                    "seasonality '{}' expects {} coefficients, found {}",
                    s.name,
                    2 * s.fourier_order,
                    s.beta.len()
                ));
            }
            if s.beta.iter().any(|b| !b.is_finite()) {
                return Err(format!("seasonality '{}' has non-finite coefficients", s.name));
            }
        }
        Ok(())
    }

    /// The `horizon` timestamps following the training window. Stops early
    /// rather than overflow the date range.
    pub fn future_index(&self, horizon: usize) -> Vec<OffsetDateTime> {
        let freq = Duration::seconds(self.freq_secs);
        (1..=i32::try_from(horizon).unwrap_or(i32::MAX))
            .map_while(|i| {
                freq.checked_mul(i)
                    .and_then(|step| self.history_end.checked_add(step))
            })
            .collect()
    }

    /// Predict over the future index.
    pub fn predict(&self, horizon: usize) -> Vec<f64> {
        self.future_index(horizon)
            .into_iter()
            .map(|ts| self.predict_at(ts))
            .collect()
    }

    fn predict_at(&self, ts: OffsetDateTime) -> f64 {
        let t = self.scaled_time(ts);
        let days = ts.unix_timestamp() as f64 / SECONDS_PER_DAY;
        let seasonal: f64 = self.seasonalities.iter().map(|s| s.component(days)).sum();
        (self.trend.at(t) + seasonal) * self.y_scale
    }

    fn scaled_time(&self, ts: OffsetDateTime) -> f64 {
        let span = (self.history_end - self.history_start).as_seconds_f64();
        (ts - self.history_start).as_seconds_f64() / span
    }
}

impl Trend {
    fn at(&self, t: f64) -> f64 {
        let (mut k, mut m) = (self.k, self.m);
        for cp in self.changepoints.iter().filter(|cp| cp.t <= t) {
            k += cp.delta;
            // Keeps the trend continuous at the changepoint.
            m -= cp.t * cp.delta;
        }
        k * t + m
    }
}

impl Seasonality {
    fn component(&self, days: f64) -> f64 {
        (0..self.fourier_order)
            .map(|i| {
                let x = 2.0 * PI * (i + 1) as f64 * days / self.period_days;
                self.beta[2 * i] * x.sin() + self.beta[2 * i + 1] * x.cos()
            })
            .sum()
    }
}

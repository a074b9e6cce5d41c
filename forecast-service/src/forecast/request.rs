use std::{fmt, str::FromStr};

use energy_client::domain::Metric;

use crate::forecast::error::ForecastError;

/// Model backends a caller may ask for.
///
/// Gradient-boosting kinds are accepted on the wire but have no strategy
/// behind them; the engine answers them with `NotImplemented`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelKind {
    #[default]
    Smoothing,
    Pretrained,
    BoostingA,
    BoostingB,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Smoothing,
        ModelKind::Pretrained,
        ModelKind::BoostingA,
        ModelKind::BoostingB,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Smoothing => "smoothing",
            ModelKind::Pretrained => "pretrained",
            ModelKind::BoostingA => "boosting-a",
            ModelKind::BoostingB => "boosting-b",
        }
    }

    /// Short names used by existing dashboard clients.
    fn alias(self) -> &'static str {
        match self {
            ModelKind::Smoothing => "hw",
            ModelKind::Pretrained => "prophet",
            ModelKind::BoostingA => "xgb",
            ModelKind::BoostingB => "lgbm",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ModelKind::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized || k.alias() == normalized)
            .ok_or_else(|| ForecastError::UnknownModel { given: s.to_string() })
    }
}

/// Number of hourly periods to forecast, always within `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Horizon(u32);

impl Horizon {
    pub const MIN: u32 = 1;
    /// Two weeks of hourly periods.
    pub const MAX: u32 = 336;
    pub const DEFAULT: Horizon = Horizon(48);

    pub fn new(periods: i64) -> Result<Self, ForecastError> {
        if periods < i64::from(Self::MIN) || periods > i64::from(Self::MAX) {
            return Err(ForecastError::InvalidHorizon { given: periods });
        }
        Ok(Horizon(periods as u32))
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A validated forecast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastRequest {
    pub metric: Metric,
    pub horizon: Horizon,
    pub model: ModelKind,
}

impl ForecastRequest {
    /// Validate raw request parameters. The metric is checked first so an
    /// unknown metric is reported even when other parameters are also bad.
    pub fn parse(metric: &str, horizon: Option<i64>, model: Option<&str>) -> Result<Self, ForecastError> {
        let metric: Metric = metric.parse()?;
        let horizon = horizon.map(Horizon::new).transpose()?.unwrap_or_default();
        let model = model.map(str::parse::<ModelKind>).transpose()?.unwrap_or_default();

        Ok(Self {
            metric,
            horizon,
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_smoothing_over_48_hours() {
        let req = ForecastRequest::parse("demand", None, None).unwrap();
        assert_eq!(req.metric, Metric::Demand);
        assert_eq!(req.horizon.get(), 48);
        assert_eq!(req.model, ModelKind::Smoothing);
    }

    #[test]
    fn horizon_bounds_are_inclusive() {
        assert_eq!(Horizon::new(1).unwrap().get(), 1);
        assert_eq!(Horizon::new(336).unwrap().get(), 336);
        assert!(matches!(Horizon::new(0), Err(ForecastError::InvalidHorizon { given: 0 })));
        assert!(matches!(Horizon::new(337), Err(ForecastError::InvalidHorizon { given: 337 })));
        assert!(matches!(Horizon::new(-5), Err(ForecastError::InvalidHorizon { .. })));
    }

    #[test]
    fn model_kinds_accept_canonical_names_and_aliases() {
        assert_eq!("smoothing".parse::<ModelKind>().unwrap(), ModelKind::Smoothing);
        assert_eq!("HW".parse::<ModelKind>().unwrap(), ModelKind::Smoothing);
        assert_eq!("prophet".parse::<ModelKind>().unwrap(), ModelKind::Pretrained);
        assert_eq!("boosting-a".parse::<ModelKind>().unwrap(), ModelKind::BoostingA);
        assert_eq!("xgb".parse::<ModelKind>().unwrap(), ModelKind::BoostingA);
        assert_eq!("lgbm".parse::<ModelKind>().unwrap(), ModelKind::BoostingB);
        assert!(matches!(
            "arima".parse::<ModelKind>(),
            Err(ForecastError::UnknownModel { .. })
        ));
    }

    #[test]
    fn unknown_metric_wins_over_other_errors() {
        let err = ForecastRequest::parse("plutonium", Some(0), Some("arima")).unwrap_err();
        assert!(matches!(err, ForecastError::UnknownMetric(_)));
    }
}

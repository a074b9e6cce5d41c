//! Short-horizon forecasting of a single metric.
//!
//! A request flows loader -> strategy -> rounding -> timestamps:
//! [`loader`] pulls the user's history in MWh, [`engine`] picks a strategy
//! ([`smoothing`] fit per call, or a cached [`pretrained`] artifact from the
//! [`registry`]) and zips the predictions with hourly future timestamps.

pub mod engine;
pub mod error;
pub mod loader;
pub mod pretrained;
pub mod registry;
pub mod request;
pub mod smoothing;

pub use engine::{ForecastEngine, ForecastPoint};
pub use error::{ArtifactError, ForecastError};
pub use loader::{HistoricalSeries, InMemorySeriesSource, PgSeriesSource, SeriesSource};
pub use registry::{ArtifactStore, FsArtifactStore, ModelRegistry};
pub use request::{ForecastRequest, Horizon, ModelKind};

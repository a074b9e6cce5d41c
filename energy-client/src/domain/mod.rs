pub mod metric;
pub mod reading;

pub use metric::{Metric, UnknownMetric};
pub use reading::Reading;

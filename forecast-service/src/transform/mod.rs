use crate::pipeline::{Envelope, PipelineError, Transform};
use energy_client::domain::Reading;
use time::macros::datetime;

/// Pure validation of a `Reading` record.
///
/// Rules:
/// - every quantity must be finite and non-negative.
/// - ts must be within a broad sanity window [2000-01-01, 2100-01-01].
pub fn validate_reading(env: Envelope<Reading>) -> Result<Envelope<Reading>, PipelineError> {
    let r = &env.payload;
    let at = env.line.map(|l| format!(" (line {l})")).unwrap_or_default();

    for (column, value) in r.quantities() {
        if !value.is_finite() || value < 0.0 {
            return Err(PipelineError::Transform(format!(
                "{column} must be a non-negative number, got {value}{at}"
            )));
        }
    }

    let min_ts = datetime!(2000-01-01 00:00:00 UTC);
    let max_ts = datetime!(2100-01-01 00:00:00 UTC);

    if r.ts < min_ts || r.ts > max_ts {
        return Err(PipelineError::Transform(format!("timestamp out of allowed range{at}")));
    }

    Ok(env)
}

#[derive(Clone, Default)]
pub struct ReadingValidation;

#[async_trait::async_trait]
impl Transform<Reading> for ReadingValidation {
    async fn apply(&self, input: Envelope<Reading>) -> Result<Envelope<Reading>, PipelineError> {
        match validate_reading(input) {
            Ok(env) => Ok(env),
            Err(e) => {
                metrics::counter!("validation_reading_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}

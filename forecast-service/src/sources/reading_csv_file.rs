use std::{fs::File, path::PathBuf};

use csv::StringRecord;
use energy_client::domain::Reading;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

/// CSV backfill source for one user's `Reading`s.
///
/// Expected header columns (by name):
/// - timestamp (RFC3339; `ts` is accepted too)
/// - consumption_kwh, production_kwh
/// - nuclear_kwh, wind_kwh, hydroelectric_kwh, oil_and_gas_kwh, coal_kwh,
///   solar_kwh, biomass_kwh
pub struct ReadingCsvFileSource {
    path: PathBuf,
    user_id: Uuid,
}

impl ReadingCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P, user_id: Uuid) -> Self {
        Self {
            path: path.into(),
            user_id,
        }
    }
}

fn record_to_reading(
    record: &StringRecord,
    headers: &StringRecord,
    user_id: Uuid,
) -> Result<Reading, PipelineError> {
    let get = |name: &str| -> Option<&str> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .and_then(|idx| record.get(idx))
    };
    let kwh = |name: &str| -> Result<f64, PipelineError> {
        let raw = get(name)
            .ok_or_else(|| PipelineError::Source(format!("missing column '{name}' in CSV record")))?;
        raw.trim()
            .parse()
            .map_err(|e| PipelineError::Source(format!("invalid {name} '{raw}': {e}")))
    };

    let ts_str = get("timestamp")
        .or_else(|| get("ts"))
        .ok_or_else(|| PipelineError::Source("missing column 'timestamp' in CSV record".to_string()))?;
    let ts = OffsetDateTime::parse(ts_str.trim(), &time::format_description::well_known::Rfc3339)
        .map_err(|e| PipelineError::Source(format!("invalid timestamp '{ts_str}': {e}")))?;

    Ok(Reading {
        user_id,
        ts,
        consumption_kwh: kwh("consumption_kwh")?,
        production_kwh: kwh("production_kwh")?,
        nuclear_kwh: kwh("nuclear_kwh")?,
        wind_kwh: kwh("wind_kwh")?,
        hydroelectric_kwh: kwh("hydroelectric_kwh")?,
        oil_and_gas_kwh: kwh("oil_and_gas_kwh")?,
        coal_kwh: kwh("coal_kwh")?,
        solar_kwh: kwh("solar_kwh")?,
        biomass_kwh: kwh("biomass_kwh")?,
    })
}

#[async_trait::async_trait]
impl Source<Reading> for ReadingCsvFileSource {
    async fn stream(&self) -> EnvelopeStream<Reading> {
        // Blocking CSV reads inside one task; backfills are offline jobs.
        let path = self.path.clone();
        let user_id = self.user_id;
        let s = async_stream::try_stream! {
            let file = File::open(&path)
                .map_err(|e| PipelineError::Source(format!("failed to open CSV file: {e}")))?;
            let mut rdr = csv::Reader::from_reader(file);
            let headers = rdr
                .headers()
                .map_err(|e| PipelineError::Source(format!("failed to read CSV headers: {e}")))?
                .clone();

            for (idx, result) in rdr.records().enumerate() {
                let record = result.map_err(|e| PipelineError::Source(format!(
                    "failed to read CSV record: {e}"
                )))?;

                let reading = match record_to_reading(&record, &headers, user_id) {
                    Ok(r) => r,
                    Err(e) => {
                        metrics::counter!("reading_csv_parse_errors_total").increment(1);
                        Err(e)?
                    }
                };

                // Header is line 1.
                yield Envelope::new(reading, Some(idx as u64 + 2));
            }
        };

        Box::pin(s)
    }
}

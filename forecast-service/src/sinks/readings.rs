use std::time::Duration;

use energy_client::domain::Reading;
use futures::StreamExt;
use sqlx::{postgres::PgPool, Postgres, QueryBuilder};

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Sink, SinkReport};

/// Batched inserts into `energy_readings`.
///
/// Rows whose (user_id, ts) already exists are skipped, so re-running a
/// backfill is harmless.
pub struct PgReadingSink {
    pool: PgPool,
    batch_size: usize,
    max_retries: u32,
    retry_backoff: Duration,
}

impl PgReadingSink {
    pub fn new(pool: PgPool, batch_size: usize, max_retries: u32, retry_backoff: Duration) -> Self {
        Self {
            pool,
            batch_size: batch_size.max(1),
            max_retries,
            retry_backoff,
        }
    }

    async fn flush_batch(&self, batch: &[Envelope<Reading>]) -> Result<u64, PipelineError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut attempt: u32 = 0;
        loop {
            match self.insert_batch(batch).await {
                Ok(inserted) => {
                    metrics::counter!("readings_ingested_total").increment(inserted);
                    let skipped = batch.len() as u64 - inserted;
                    if skipped > 0 {
                        tracing::debug!(skipped, "duplicate readings skipped");
                    }
                    return Ok(inserted);
                }
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    let sleep_for = self.retry_backoff * attempt;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        "reading sink flush failed, retrying with backoff"
                    );
                    tokio::time::sleep(sleep_for).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "reading sink flush failed, giving up");
                    metrics::counter!("reading_sink_errors_total").increment(1);
                    return Err(PipelineError::Sink(e.to_string()));
                }
            }
        }
    }

    async fn insert_batch(&self, batch: &[Envelope<Reading>]) -> Result<u64, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO energy_readings (user_id, ts, consumption_kwh, production_kwh, nuclear_kwh, \
             wind_kwh, hydroelectric_kwh, oil_and_gas_kwh, coal_kwh, solar_kwh, biomass_kwh) ",
        );

        builder.push_values(batch, |mut b, env| {
            let r = &env.payload;
            b.push_bind(r.user_id)
                .push_bind(r.ts)
                .push_bind(r.consumption_kwh)
                .push_bind(r.production_kwh)
                .push_bind(r.nuclear_kwh)
                .push_bind(r.wind_kwh)
                .push_bind(r.hydroelectric_kwh)
                .push_bind(r.oil_and_gas_kwh)
                .push_bind(r.coal_kwh)
                .push_bind(r.solar_kwh)
                .push_bind(r.biomass_kwh);
        });
        builder.push(" ON CONFLICT (user_id, ts) DO NOTHING");

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait::async_trait]
impl Sink<Reading> for PgReadingSink {
    async fn run(&self, mut input: EnvelopeStream<Reading>) -> Result<SinkReport, PipelineError> {
        let mut report = SinkReport::default();
        let mut buffer: Vec<Envelope<Reading>> = Vec::with_capacity(self.batch_size);

        while let Some(item) = input.next().await {
            let env = match item {
                Ok(env) => env,
                Err(e) => {
                    tracing::error!(error = %e, "error in upstream pipeline for PgReadingSink");
                    report.rejected += 1;
                    continue;
                }
            };

            buffer.push(env);
            if buffer.len() >= self.batch_size {
                report.written += self.flush_batch(&buffer).await?;
                buffer.clear();
            }
        }

        report.written += self.flush_batch(&buffer).await?;
        Ok(report)
    }
}

use anyhow::{bail, Context, Result};
use forecast_service::{
    config::AppConfig,
    observability,
    pipeline::Pipeline,
    sinks::PgReadingSink,
    sources::ReadingCsvFileSource,
    transform,
};
use energy_client::domain::Reading;
use sqlx::postgres::PgPoolOptions;
use std::{env, sync::Arc, time::Duration};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!("usage: backfill_readings <user_id> <csv_file_path>");
    }
    let user_id = Uuid::parse_str(&args[1]).with_context(|| format!("invalid user id '{}'", args[1]))?;
    let file_path = &args[2];

    let cfg = AppConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.uri)
        .await?;

    // Schema is expected to be applied out-of-band via `sql/schema/*.sql`.
    let sink = PgReadingSink::new(
        pool,
        cfg.backfill.batch_size,
        cfg.backfill.max_retries,
        Duration::from_millis(cfg.backfill.retry_backoff_ms),
    );

    let source = ReadingCsvFileSource::new(file_path, user_id);

    let pipeline: Pipeline<_, Reading, _> = Pipeline {
        source,
        transforms: vec![Arc::new(transform::ReadingValidation)],
        sink,
    };

    let report = pipeline.run().await?;
    tracing::info!(
        %user_id,
        written = report.written,
        rejected = report.rejected,
        "reading backfill finished"
    );

    Ok(())
}

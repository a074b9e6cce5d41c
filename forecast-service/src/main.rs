use anyhow::Result;
use forecast_service::{
    api::{self, AppState},
    config::AppConfig,
    forecast::{FsArtifactStore, ModelRegistry, PgSeriesSource},
    metrics_server, observability, ForecastEngine,
};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.uri)
        .await?;

    // One registry for the whole process; its artifact cache lives as long as we do.
    let registry = Arc::new(ModelRegistry::new(Arc::new(FsArtifactStore::new(
        cfg.forecast.model_dir.clone(),
    ))));
    let engine = Arc::new(ForecastEngine::new(Arc::new(PgSeriesSource::new(pool)), registry));
    let app = api::router(AppState::new(engine, cfg.forecast.max_concurrent_fits));

    let addr: SocketAddr = cfg
        .http
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid http.bind_addr: {e}"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        model_dir = %cfg.forecast.model_dir.display(),
        max_concurrent_fits = cfg.forecast.max_concurrent_fits,
        "forecast service listening"
    );

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

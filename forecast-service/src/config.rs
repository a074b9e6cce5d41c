use serde::Deserialize;
use std::{fs, path::PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind_addr: String,
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_max_concurrent_fits() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    /// Directory holding `prophet_<metric>.json` artifacts.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    #[serde(default = "default_max_concurrent_fits")]
    pub max_concurrent_fits: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            max_concurrent_fits: default_max_concurrent_fits(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackfillConfig {
    pub batch_size: usize,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            batch_size: 500,
            max_retries: 3,
            retry_backoff_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub backfill: BackfillConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("FORECAST_CONFIG").unwrap_or_else(|_| "forecast-config.toml".to_string());
        let contents = fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read config {path}: {e}"))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }
}

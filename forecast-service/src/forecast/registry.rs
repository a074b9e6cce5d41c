use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use dashmap::DashMap;
use energy_client::domain::Metric;

use crate::forecast::{error::ArtifactError, pretrained::PretrainedModel};

/// Durable storage holding serialized model artifacts.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Raw bytes stored under `name`, or `None` when there is no such artifact.
    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>, ArtifactError>;
}

/// Artifacts as files in one directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait::async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>, ArtifactError> {
        let path = self.dir.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ArtifactError::Io { path, source }),
        }
    }
}

/// Process-wide cache of deserialized pre-trained models, one per metric.
///
/// Entries are never evicted or refreshed. Concurrent first requests for a
/// metric may each load the artifact; the first successful insert wins and
/// every caller gets that instance. Failed loads are never cached.
pub struct ModelRegistry {
    store: Arc<dyn ArtifactStore>,
    cache: DashMap<Metric, Arc<PretrainedModel>>,
}

impl ModelRegistry {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            cache: DashMap::new(),
        }
    }

    /// Name of the artifact holding `metric`'s model.
    pub fn artifact_name(metric: Metric) -> String {
        format!("prophet_{}.json", metric.as_str())
    }

    /// Cached model for `metric`, loading it on first use.
    pub async fn pretrained(&self, metric: Metric) -> Result<Arc<PretrainedModel>, ArtifactError> {
        let hit = self.cache.get(&metric).map(|m| Arc::clone(m.value()));
        if let Some(model) = hit {
            return Ok(model);
        }

        let name = Self::artifact_name(metric);
        let bytes = self
            .store
            .fetch(&name)
            .await?
            .ok_or(ArtifactError::NotFound { metric })?;
        let model = PretrainedModel::from_json(&bytes)
            .map_err(|reason| ArtifactError::Corrupt { metric, reason })?;

        metrics::counter!("model_artifact_loads_total", "metric" => metric.as_str()).increment(1);
        tracing::info!(%metric, artifact = %name, "pre-trained artifact loaded");

        let entry = self.cache.entry(metric).or_insert_with(|| Arc::new(model));
        Ok(Arc::clone(entry.value()))
    }

    pub fn cached(&self, metric: Metric) -> Option<Arc<PretrainedModel>> {
        self.cache.get(&metric).map(|m| Arc::clone(m.value()))
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

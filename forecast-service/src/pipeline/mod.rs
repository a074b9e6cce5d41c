//! Source -> transforms -> sink streaming used by the reading backfill.

use std::{pin::Pin, sync::Arc, time::SystemTime};

use futures::{Stream, StreamExt};

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub received_at: SystemTime,
    /// 1-based position in the originating file, when there is one.
    pub line: Option<u64>,
}

impl<T> Envelope<T> {
    pub fn new(payload: T, line: Option<u64>) -> Self {
        Self {
            payload,
            received_at: SystemTime::now(),
            line,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error("sink error: {0}")]
    Sink(String),
}

pub type EnvelopeStream<T> = Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(&self) -> EnvelopeStream<T>;
}

#[async_trait::async_trait]
pub trait Transform<T>: Send + Sync {
    async fn apply(&self, input: Envelope<T>) -> Result<Envelope<T>, PipelineError>;
}

/// Totals reported by a sink once its input is drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub written: u64,
    pub rejected: u64,
}

#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    async fn run(&self, input: EnvelopeStream<T>) -> Result<SinkReport, PipelineError>;
}

pub struct Pipeline<S, T, K> {
    pub source: S,
    pub transforms: Vec<Arc<dyn Transform<T>>>,
    pub sink: K,
}

impl<T, S, K> Pipeline<S, T, K>
where
    T: Send + 'static,
    S: Source<T> + 'static,
    K: Sink<T> + 'static,
{
    pub async fn run(self) -> Result<SinkReport, PipelineError> {
        let mut stream = self.source.stream().await;

        for t in self.transforms {
            stream = Box::pin(stream.then(move |item| {
                let t = t.clone();
                async move {
                    match item {
                        Ok(env) => t.apply(env).await,
                        Err(e) => Err(e),
                    }
                }
            }));
        }

        self.sink.run(stream).await
    }
}

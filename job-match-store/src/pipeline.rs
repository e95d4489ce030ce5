//! Chunk-and-pool embedding pipeline.
//!
//! Long documents exceed what the embedding endpoint accepts, so the pipeline
//! cuts them into bounded chunks, embeds each chunk, and averages the chunk
//! vectors into one document vector. Only endpoint timeouts are retried;
//! every other failure propagates to the caller unchanged.

use llm_failover::RetryPolicy;
use tracing::{debug, warn};

use crate::{
    chunk::split_chunks,
    embed::{EmbeddingsProvider, mean_pool},
    errors::StoreError,
};

/// Embeds whole documents through a chunking provider.
pub struct EmbeddingPipeline<'a> {
    provider: &'a (dyn EmbeddingsProvider + 'a),
    /// Expected vector dimension; every provider result is checked.
    dim: usize,
    max_chars: usize,
    retry: RetryPolicy,
    /// Total attempts per chunk, initial call included.
    max_attempts: u32,
}

impl<'a> EmbeddingPipeline<'a> {
    pub fn new(provider: &'a (dyn EmbeddingsProvider + 'a), dim: usize, max_chars: usize) -> Self {
        Self {
            provider,
            dim,
            max_chars,
            retry: RetryPolicy::default(),
            max_attempts: 3,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy, max_attempts: u32) -> Self {
        self.retry = retry;
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Embeds one document into a single vector.
    ///
    /// Whitespace-only input short-circuits to `Ok(vec![])` without touching
    /// the provider. A single chunk's vector is returned unchanged; multiple
    /// chunks are averaged element-wise.
    ///
    /// # Errors
    /// [`StoreError::EmbedTimeout`] once the retry budget for a chunk is
    /// spent; [`StoreError::VectorSizeMismatch`] when the provider returns
    /// the wrong dimension; other provider errors propagate immediately.
    pub async fn embed_document(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        if text.trim().is_empty() {
            debug!("blank document, skipping embedding");
            return Ok(Vec::new());
        }

        let chunks: Vec<&str> = split_chunks(text, self.max_chars)
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect();
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        debug!(chunks = chunks.len(), max_chars = self.max_chars, "embedding document");

        let mut vectors = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let v = self.embed_chunk(chunk).await?;
            if v.len() != self.dim {
                return Err(StoreError::VectorSizeMismatch {
                    got: v.len(),
                    want: self.dim,
                });
            }
            vectors.push(v);
        }

        if vectors.len() == 1 {
            let mut single = vectors;
            return Ok(single.remove(0));
        }
        mean_pool(&vectors)
    }

    /// One chunk with a bounded timeout-retry loop.
    async fn embed_chunk(&self, chunk: &str) -> Result<Vec<f32>, StoreError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.provider.embed(chunk).await {
                Ok(v) => return Ok(v),
                Err(StoreError::EmbedTimeout) if attempt < self.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "embedding timed out, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Provider replaying scripted outcomes; repeats the last one.
    struct Scripted {
        calls: AtomicU32,
        script: Mutex<Vec<Result<Vec<f32>, StoreError>>>,
    }

    impl Scripted {
        fn new(script: Vec<Result<Vec<f32>, StoreError>>) -> Self {
            Self {
                calls: AtomicU32::new(0),
                script: Mutex::new(script),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EmbeddingsProvider for Scripted {
        fn embed<'a>(
            &'a self,
            _text: &'a str,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<Vec<f32>, StoreError>> + Send + 'a>,
        > {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let mut script = self.script.lock().unwrap();
                if script.len() > 1 {
                    script.remove(0)
                } else {
                    match &script[0] {
                        Ok(v) => Ok(v.clone()),
                        Err(StoreError::EmbedTimeout) => Err(StoreError::EmbedTimeout),
                        Err(e) => Err(StoreError::Embed(e.to_string())),
                    }
                }
            })
        }
    }

    fn instant_retry() -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::ZERO,
            multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn blank_document_makes_no_calls() {
        let p = Scripted::new(vec![Ok(vec![1.0; 3])]);
        let pipe = EmbeddingPipeline::new(&p, 3, 10);
        let v = pipe.embed_document("   \n\t ").await.unwrap();
        assert!(v.is_empty());
        assert_eq!(p.calls(), 0);
    }

    #[tokio::test]
    async fn single_chunk_vector_is_returned_unchanged() {
        let p = Scripted::new(vec![Ok(vec![0.25, -0.5, 1.0])]);
        let pipe = EmbeddingPipeline::new(&p, 3, 100);
        let v = pipe.embed_document("short text").await.unwrap();
        assert_eq!(v, vec![0.25, -0.5, 1.0]);
        assert_eq!(p.calls(), 1);
    }

    #[tokio::test]
    async fn two_chunks_are_averaged() {
        let p = Scripted::new(vec![Ok(vec![1.0, 2.0]), Ok(vec![3.0, 4.0])]);
        let pipe = EmbeddingPipeline::new(&p, 2, 5);
        // 10 chars -> two 5-char chunks
        let v = pipe.embed_document("aaaaabbbbb").await.unwrap();
        assert_eq!(v, vec![2.0, 3.0]);
        assert_eq!(p.calls(), 2);
    }

    #[tokio::test]
    async fn timeout_is_retried_then_succeeds() {
        let p = Scripted::new(vec![Err(StoreError::EmbedTimeout), Ok(vec![1.0, 1.0])]);
        let pipe = EmbeddingPipeline::new(&p, 2, 100).with_retry(instant_retry(), 3);
        let v = pipe.embed_document("text").await.unwrap();
        assert_eq!(v, vec![1.0, 1.0]);
        assert_eq!(p.calls(), 2);
    }

    #[tokio::test]
    async fn timeout_budget_is_bounded() {
        let p = Scripted::new(vec![Err(StoreError::EmbedTimeout)]);
        let pipe = EmbeddingPipeline::new(&p, 2, 100).with_retry(instant_retry(), 3);
        let err = pipe.embed_document("text").await.unwrap_err();
        assert!(matches!(err, StoreError::EmbedTimeout));
        assert_eq!(p.calls(), 3);
    }

    #[tokio::test]
    async fn non_timeout_errors_propagate_immediately() {
        let p = Scripted::new(vec![Err(StoreError::Embed("boom".into()))]);
        let pipe = EmbeddingPipeline::new(&p, 2, 100).with_retry(instant_retry(), 3);
        let err = pipe.embed_document("text").await.unwrap_err();
        assert!(matches!(err, StoreError::Embed(_)));
        assert_eq!(p.calls(), 1);
    }

    #[tokio::test]
    async fn wrong_dimension_is_rejected() {
        let p = Scripted::new(vec![Ok(vec![1.0, 2.0, 3.0])]);
        let pipe = EmbeddingPipeline::new(&p, 2, 100);
        let err = pipe.embed_document("text").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::VectorSizeMismatch { got: 3, want: 2 }
        ));
    }
}

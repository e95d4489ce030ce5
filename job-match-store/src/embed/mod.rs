//! Embedding providers and pooling helpers.

pub mod hf_endpoint;

use std::{future::Future, pin::Pin};

use crate::errors::StoreError;

pub use hf_endpoint::HfEndpointEmbedder;

/// Async embedding provider seam.
///
/// Object-safe so the pipeline and the store can hold `dyn` providers and
/// tests can script outcomes.
pub trait EmbeddingsProvider: Send + Sync {
    /// Embeds one text into a single vector.
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, StoreError>> + Send + 'a>>;
}

/// Element-wise arithmetic mean over equal-length vectors.
///
/// # Errors
/// [`StoreError::VectorSizeMismatch`] when lengths differ; `Embed` on empty
/// input (callers are expected to filter empty chunk sets beforehand).
pub fn mean_pool(vectors: &[Vec<f32>]) -> Result<Vec<f32>, StoreError> {
    let first = vectors
        .first()
        .ok_or_else(|| StoreError::Embed("mean_pool over empty vector set".into()))?;
    let dim = first.len();

    let mut acc = vec![0f32; dim];
    for v in vectors {
        if v.len() != dim {
            return Err(StoreError::VectorSizeMismatch {
                got: v.len(),
                want: dim,
            });
        }
        for (a, x) in acc.iter_mut().zip(v) {
            *a += x;
        }
    }
    let n = vectors.len() as f32;
    for a in &mut acc {
        *a /= n;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_single_vector_is_identity() {
        let v = vec![vec![0.5, -1.0, 2.0]];
        assert_eq!(mean_pool(&v).unwrap(), vec![0.5, -1.0, 2.0]);
    }

    #[test]
    fn mean_of_two_vectors_is_elementwise() {
        let v = vec![vec![1.0, 2.0, 3.0], vec![3.0, 4.0, 5.0]];
        assert_eq!(mean_pool(&v).unwrap(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let v = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(
            mean_pool(&v),
            Err(StoreError::VectorSizeMismatch { got: 1, want: 2 })
        ));
    }
}

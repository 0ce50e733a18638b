//! Dense encoder port (§4.5).

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::DenseVector;

/// Produces L2-normalized dense embeddings of configured dimensionality `D`.
///
/// Mirrors the reference codebase's `EmbeddingProvider` shape: a default
/// single-text `embed` delegates to `embed_batch`, so implementations only
/// need to provide the batched path.
#[async_trait]
pub trait DenseEncoder: Send + Sync {
    /// Embed a single text.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch call underlying this fails.
    async fn embed(&self, text: &str) -> Result<DenseVector> {
        let mut batch = self.embed_batch(std::slice::from_ref(&text.to_owned())).await?;
        batch
            .pop()
            .ok_or_else(|| crate::error::Error::internal("embed_batch returned no vectors for one input"))
    }

    /// Embed a batch of texts, preserving order. Batches larger than the
    /// configured max (default 32, §4.5) are the caller's responsibility to
    /// split; failed batches are retried individually by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding backend is unavailable or rejects the input.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<DenseVector>>;

    /// Dimensionality `D` of vectors produced by this encoder.
    fn dimensions(&self) -> usize;
}

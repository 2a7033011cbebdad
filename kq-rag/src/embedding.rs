//! Embedding provider trait for turning text into vectors.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that maps text to fixed-dimension embedding vectors.
///
/// Implementations wrap a specific backend (a local model or a remote API)
/// behind one interface so the index and retriever stay provider-agnostic.
/// For a fixed model version the mapping must be deterministic: the same
/// text always produces the same vector, which keeps index builds
/// reproducible.
///
/// Empty-string policy: an empty (or, for token-based providers, an
/// all-stop-word) input embeds to the all-zero vector. Zero vectors score
/// 0.0 under cosine similarity, so such inputs are never retrieved above a
/// positive threshold.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// Preserves input order and returns exactly one vector per input, all
    /// of [`dimensions()`](EmbeddingProvider::dimensions) width. The default
    /// implementation embeds sequentially; backends with native batch
    /// endpoints should override it.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The dimensionality of every vector this provider produces.
    fn dimensions(&self) -> usize;

    /// Stable identifier for the backing model, recorded in the persisted
    /// index manifest and checked on load.
    fn model_id(&self) -> &str;
}

//! Local deterministic embedding provider based on feature hashing.
//!
//! The fully offline counterpart to the remote API provider: tokens are
//! hashed into a fixed number of buckets with a sign bit, and the bucket
//! counts are L2-normalized. Texts sharing vocabulary land near each other
//! under cosine similarity, which is enough for small fixed corpora and
//! keeps index builds reproducible without model weights or network access.

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;

/// Default embedding width, matching common small sentence-encoder models.
const DEFAULT_DIMENSIONS: usize = 384;

/// Common English function words excluded from hashing.
///
/// Without this, short questions ("What is ...?") are dominated by words
/// that carry no topical signal.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "do", "does", "for", "from", "how",
    "i", "in", "is", "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "we",
    "what", "when", "where", "which", "who", "why", "will", "with", "you",
];

/// An [`EmbeddingProvider`] that hashes word features into a fixed width.
///
/// Tokens are hashed with FNV-1a, whose output is fixed by definition, so
/// the same text produces the same vector on every toolchain and the
/// `model_id` recorded in a persisted index genuinely pins the vector
/// function. Suitable for tests, offline use, and the free local mode;
/// not a semantic model.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimensions: usize,
    model_id: String,
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl HashEmbeddingProvider {
    /// Create a provider producing vectors of the given width.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, model_id: format!("feature-hash-{dimensions}") }
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in tokenize(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a. Persisted vectors depend on this function, so it must
/// never change; a different hash means a different `model_id`.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Lowercase alphanumeric tokens with stop words removed.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn same_text_same_vector() {
        let provider = HashEmbeddingProvider::default();
        let a = provider.embed("control charts monitor process stability").await.unwrap();
        let b = provider.embed("control charts monitor process stability").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), provider.dimensions());
    }

    #[tokio::test]
    async fn vectors_are_pinned_to_the_published_hash() {
        // FNV-1a reference values; an index built on one toolchain must
        // load and score identically on any other.
        assert_eq!(fnv1a(b"six"), 0x8248_8b19_5cec_9f4b);
        assert_eq!(fnv1a(b"sigma"), 0xdc02_2c4f_3092_a794);

        let provider = HashEmbeddingProvider::default();
        let v = provider.embed("pareto chart").await.unwrap();
        let inv_sqrt2 = 1.0 / 2.0f32.sqrt();
        assert!((v[11] - inv_sqrt2).abs() < 1e-6); // "chart", positive sign
        assert!((v[354] + inv_sqrt2).abs() < 1e-6); // "pareto", negative sign
        assert!(v.iter().enumerate().all(|(i, x)| i == 11 || i == 354 || *x == 0.0));
    }

    #[tokio::test]
    async fn empty_text_embeds_to_zero_vector() {
        let provider = HashEmbeddingProvider::default();
        let v = provider.embed("").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn vectors_are_unit_length() {
        let provider = HashEmbeddingProvider::default();
        let v = provider.embed("pareto analysis of defect categories").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn shared_vocabulary_scores_higher_than_disjoint() {
        let provider = HashEmbeddingProvider::default();
        let query = provider.embed("What is Six Sigma?").await.unwrap();
        let related = provider
            .embed("Six Sigma is a data-driven method for process improvement")
            .await
            .unwrap();
        let unrelated = provider.embed("The cafeteria menu changes every Tuesday").await.unwrap();

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
        assert!(cosine(&query, &related) > 0.5);
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let provider = HashEmbeddingProvider::new(64);
        let texts = ["fishbone diagram", "check sheet", "histogram"];
        let batch = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), 3);
        for (text, vector) in texts.iter().zip(&batch) {
            assert_eq!(*vector, provider.embed(text).await.unwrap());
        }
    }
}

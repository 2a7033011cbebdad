//! Vector index trait and similarity metrics.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{IndexEntry, SearchResult};
use crate::error::Result;

/// Similarity metric, fixed when an index is created.
///
/// The metric is recorded in the persisted manifest; loading an index built
/// with a different metric fails rather than silently returning degraded
/// scores. Both metrics report higher-is-better scores so threshold and
/// ordering semantics are uniform: cosine similarity directly, and
/// `1 / (1 + distance)` for L2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Cosine similarity in `[-1, 1]`.
    Cosine,
    /// Euclidean distance mapped into `(0, 1]`.
    L2,
}

impl Metric {
    /// Score two vectors of equal width. Higher is more similar.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::Cosine => cosine_similarity(a, b),
            Metric::L2 => {
                let dist: f32 =
                    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt();
                1.0 / (1.0 + dist)
            }
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Cosine => write!(f, "cosine"),
            Metric::L2 => write!(f, "l2"),
        }
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Parameters for a similarity search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum number of results to return.
    pub top_k: usize,
    /// Minimum score; results scoring below this are excluded.
    pub threshold: f32,
    /// When set, only chunks from this document are considered.
    pub document_id: Option<String>,
}

/// A searchable collection of (vector, chunk) pairs.
///
/// `add` is serialized (single-writer); `search` is safe to call
/// concurrently against an index that is not being mutated.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Append entries to the index, preserving caller order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch)
    /// if any entry's vector width differs from the index dimensionality.
    /// The index is left unmodified in that case.
    async fn add(&self, entries: Vec<IndexEntry>) -> Result<()>;

    /// Search for the most similar chunks to the given embedding.
    ///
    /// Returns at most `top_k` results, all scoring at least `threshold`,
    /// in non-increasing score order. Ties are broken by
    /// `(document_id, seq)` ascending so results are deterministic across
    /// runs. An empty index yields an empty result set.
    async fn search(&self, embedding: &[f32], options: &SearchOptions) -> Result<Vec<SearchResult>>;

    /// Number of entries currently stored.
    async fn len(&self) -> usize;

    /// The vector width this index was created with.
    fn dimensions(&self) -> usize;

    /// The similarity metric this index was created with.
    fn metric(&self) -> Metric;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.6f32, 0.8, 0.0];
        assert!((Metric::Cosine.score(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(Metric::Cosine.score(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn l2_score_decreases_with_distance() {
        let origin = [0.0f32, 0.0];
        let near = Metric::L2.score(&origin, &[0.1, 0.0]);
        let far = Metric::L2.score(&origin, &[3.0, 4.0]);
        assert!((Metric::L2.score(&origin, &origin) - 1.0).abs() < 1e-6);
        assert!(near > far);
        assert!((far - 1.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn metric_tag_round_trips_through_serde() {
        let json = serde_json::to_string(&Metric::Cosine).unwrap();
        assert_eq!(json, "\"cosine\"");
        let back: Metric = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Metric::Cosine);
    }
}

//! Brute-force in-memory vector index.
//!
//! A linear scan over all entries is the documented default at this corpus
//! scale (hundreds of chunks); approximate structures can implement the
//! same [`VectorIndex`] trait when the corpus outgrows it.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{IndexEntry, SearchResult};
use crate::error::{RagError, Result};
use crate::index::{Metric, SearchOptions, VectorIndex};

/// A flat vector index backed by an entry vector behind a `tokio::sync::RwLock`.
///
/// Entries are append-only; concurrent searches share the read lock while
/// `add` takes the write lock, so readers never observe a partial write.
#[derive(Debug)]
pub struct FlatIndex {
    dimensions: usize,
    metric: Metric,
    entries: RwLock<Vec<IndexEntry>>,
}

impl FlatIndex {
    /// Create an empty index with a fixed dimensionality and metric.
    pub fn new(dimensions: usize, metric: Metric) -> Self {
        Self { dimensions, metric, entries: RwLock::new(Vec::new()) }
    }

    /// Create an index pre-populated with entries, e.g. when loading from
    /// disk.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if any entry has the wrong
    /// vector width.
    pub fn with_entries(
        dimensions: usize,
        metric: Metric,
        entries: Vec<IndexEntry>,
    ) -> Result<Self> {
        check_dimensions(dimensions, &entries)?;
        Ok(Self { dimensions, metric, entries: RwLock::new(entries) })
    }

    /// Clone out the current entries, e.g. for persistence.
    pub async fn snapshot(&self) -> Vec<IndexEntry> {
        self.entries.read().await.clone()
    }
}

fn check_dimensions(dimensions: usize, entries: &[IndexEntry]) -> Result<()> {
    for entry in entries {
        if entry.embedding.len() != dimensions {
            return Err(RagError::DimensionMismatch {
                expected: dimensions,
                actual: entry.embedding.len(),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl VectorIndex for FlatIndex {
    async fn add(&self, entries: Vec<IndexEntry>) -> Result<()> {
        // Validate every entry before touching the index so a mismatch
        // never leaves it partially extended.
        check_dimensions(self.dimensions, &entries)?;
        self.entries.write().await.extend(entries);
        Ok(())
    }

    async fn search(
        &self,
        embedding: &[f32],
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        if embedding.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }

        let entries = self.entries.read().await;
        let mut scored: Vec<SearchResult> = entries
            .iter()
            .filter(|entry| match &options.document_id {
                Some(id) => entry.chunk.document_id == *id,
                None => true,
            })
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: self.metric.score(&entry.embedding, embedding),
            })
            .filter(|result| result.score >= options.threshold)
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.document_id.cmp(&b.chunk.document_id))
                .then_with(|| a.chunk.seq.cmp(&b.chunk.seq))
        });
        scored.truncate(options.top_k);
        Ok(scored)
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn metric(&self) -> Metric {
        self.metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Chunk;

    fn entry(document_id: &str, seq: usize, embedding: Vec<f32>) -> IndexEntry {
        IndexEntry {
            chunk: Chunk::new(document_id, seq, 0..0, format!("{document_id} chunk {seq}")),
            embedding,
        }
    }

    fn options(top_k: usize, threshold: f32) -> SearchOptions {
        SearchOptions { top_k, threshold, document_id: None }
    }

    #[tokio::test]
    async fn empty_index_returns_no_results() {
        let index = FlatIndex::new(2, Metric::Cosine);
        let results = index.search(&[1.0, 0.0], &options(5, 0.0)).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn add_rejects_mismatched_dimensions_without_mutating() {
        let index = FlatIndex::new(384, Metric::Cosine);
        let err = index
            .add(vec![entry("a.txt", 0, vec![0.0; 384]), entry("a.txt", 1, vec![0.0; 768])])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 384, actual: 768 }));
        assert_eq!(index.len().await, 0);
    }

    #[tokio::test]
    async fn search_rejects_mismatched_query_vector() {
        let index = FlatIndex::new(3, Metric::Cosine);
        let err = index.search(&[1.0, 0.0], &options(1, 0.0)).await.unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn threshold_and_top_k_are_applied() {
        let index = FlatIndex::new(2, Metric::Cosine);
        index
            .add(vec![
                entry("a.txt", 0, vec![1.0, 0.0]),
                entry("a.txt", 1, vec![0.9, 0.1]),
                entry("a.txt", 2, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.0], &options(2, 0.5)).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.score >= 0.5));
        assert!(results[0].score >= results[1].score);
        assert_eq!(results[0].chunk.seq, 0);
    }

    #[tokio::test]
    async fn equal_scores_tie_break_by_document_then_seq() {
        let index = FlatIndex::new(2, Metric::Cosine);
        // Same vector in two documents and twice in one document.
        index
            .add(vec![
                entry("b.txt", 0, vec![1.0, 0.0]),
                entry("a.txt", 3, vec![1.0, 0.0]),
                entry("a.txt", 1, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.0], &options(3, 0.0)).await.unwrap();
        let order: Vec<(&str, usize)> =
            results.iter().map(|r| (r.chunk.document_id.as_str(), r.chunk.seq)).collect();
        assert_eq!(order, vec![("a.txt", 1), ("a.txt", 3), ("b.txt", 0)]);
    }

    #[tokio::test]
    async fn document_scope_filters_before_truncation() {
        let index = FlatIndex::new(2, Metric::Cosine);
        index
            .add(vec![
                entry("a.txt", 0, vec![1.0, 0.0]),
                entry("b.txt", 0, vec![1.0, 0.0]),
                entry("b.txt", 1, vec![0.8, 0.2]),
            ])
            .await
            .unwrap();

        let mut opts = options(1, 0.0);
        opts.document_id = Some("b.txt".to_string());
        let results = index.search(&[1.0, 0.0], &opts).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.document_id, "b.txt");
        assert_eq!(results[0].chunk.seq, 0);

        opts.document_id = Some("missing.txt".to_string());
        assert!(index.search(&[1.0, 0.0], &opts).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn l2_metric_orders_by_proximity() {
        let index = FlatIndex::new(2, Metric::L2);
        index
            .add(vec![entry("a.txt", 0, vec![0.0, 0.0]), entry("a.txt", 1, vec![3.0, 4.0])])
            .await
            .unwrap();

        let results = index.search(&[0.1, 0.0], &options(2, 0.0)).await.unwrap();
        assert_eq!(results[0].chunk.seq, 0);
        assert!(results[0].score > results[1].score);
    }
}

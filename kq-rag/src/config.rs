//! Configuration for the retrieval pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Tuning parameters for chunking and retrieval.
///
/// Thresholds and result caps are configuration, not hard-coded behavior;
/// the defaults come from the corpus this system was tuned on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// Number of top results to return from vector search.
    pub top_k: usize,
    /// Minimum similarity score for a result to count as relevant.
    pub score_threshold: f32,
    /// Identifier of the embedding model the index is built with.
    pub embed_model: String,
    /// Directory holding the persisted index.
    pub index_dir: PathBuf,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 120,
            top_k: 4,
            score_threshold: 0.35,
            embed_model: "feature-hash-384".to_string(),
            index_dir: PathBuf::from("vector_store/index"),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a validated [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results to return from vector search.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity score for relevant results.
    pub fn score_threshold(mut self, threshold: f32) -> Self {
        self.config.score_threshold = threshold;
        self
    }

    /// Set the embedding model identifier.
    pub fn embed_model(mut self, model: impl Into<String>) -> Self {
        self.config.embed_model = model.into();
        self
    }

    /// Set the persisted index directory.
    pub fn index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.index_dir = dir.into();
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_size == 0` or `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `score_threshold` is outside `0.0..=1.0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if !(0.0..=1.0).contains(&self.config.score_threshold) {
            return Err(RagError::Config(format!(
                "score_threshold ({}) must be within 0.0..=1.0",
                self.config.score_threshold
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RagConfig::builder().build().unwrap();
        assert_eq!(config, RagConfig::default());
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(RagConfig::builder().chunk_size(100).chunk_overlap(100).build().is_err());
    }

    #[test]
    fn rejects_zero_top_k() {
        assert!(RagConfig::builder().top_k(0).build().is_err());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(RagConfig::builder().score_threshold(1.5).build().is_err());
        assert!(RagConfig::builder().score_threshold(-0.1).build().is_err());
    }

    #[test]
    fn round_trips_through_serde() {
        let config = RagConfig::builder().top_k(8).score_threshold(0.5).build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: RagConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

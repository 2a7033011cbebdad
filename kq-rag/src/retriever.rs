//! Query-time retrieval against the active index.
//!
//! The retriever owns the process-wide active index as a swappable
//! reference: rebuilds construct a new index and [`swap`](Retriever::swap)
//! it in atomically, so concurrent queries see either the old or the new
//! index and never a half-written one.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Document, IndexEntry, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::{Metric, SearchOptions, VectorIndex};
use crate::persist::{self, IndexSpec};

/// Per-call overrides for retrieval; `None` falls back to the
/// [`RagConfig`] defaults.
#[derive(Debug, Clone, Default)]
pub struct RetrieveOptions {
    /// Maximum number of results.
    pub top_k: Option<usize>,
    /// Minimum relevance score.
    pub score_threshold: Option<f32>,
    /// Restrict the search to one document ("ask about this file" mode).
    pub document_id: Option<String>,
}

impl RetrieveOptions {
    /// Scope the search to a single document.
    pub fn scoped_to(document_id: impl Into<String>) -> Self {
        Self { document_id: Some(document_id.into()), ..Self::default() }
    }
}

/// Embeds queries and searches the active vector index.
pub struct Retriever {
    provider: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    active: RwLock<Arc<dyn VectorIndex>>,
    config: RagConfig,
}

impl Retriever {
    /// Create a retriever over an already-built index.
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        chunker: Arc<dyn Chunker>,
        index: Arc<dyn VectorIndex>,
        config: RagConfig,
    ) -> Self {
        Self { provider, chunker, active: RwLock::new(index), config }
    }

    /// Open a retriever over the index persisted at `config.index_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexLoad`](crate::RagError::IndexLoad) if the
    /// persisted index is missing, corrupt, or does not match the
    /// provider's dimensionality and model or the given metric.
    pub fn open(
        provider: Arc<dyn EmbeddingProvider>,
        chunker: Arc<dyn Chunker>,
        config: RagConfig,
        metric: Metric,
    ) -> Result<Self> {
        let spec = IndexSpec {
            dimensions: provider.dimensions(),
            metric,
            embed_model: provider.model_id().to_string(),
        };
        let index = persist::load(&config.index_dir, &spec)?;
        Ok(Self::new(provider, chunker, Arc::new(index), config))
    }

    /// The retrieval configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Number of entries in the active index.
    pub async fn index_len(&self) -> usize {
        let index = self.active_index().await;
        index.len().await
    }

    /// Retrieve ranked passages relevant to `query`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Query`] for an empty or whitespace-only query;
    /// embedding and index failures propagate as their own kinds.
    pub async fn retrieve(
        &self,
        query: &str,
        options: &RetrieveOptions,
    ) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RagError::Query("query must not be empty".to_string()));
        }

        let embedding = self.provider.embed(query).await?;
        let search = SearchOptions {
            top_k: options.top_k.unwrap_or(self.config.top_k),
            threshold: options.score_threshold.unwrap_or(self.config.score_threshold),
            document_id: options.document_id.clone(),
        };

        let index = self.active_index().await;
        let results = index.search(&embedding, &search).await?;
        debug!(results = results.len(), scoped = search.document_id.is_some(), "retrieval complete");
        Ok(results)
    }

    /// Atomically replace the active index, e.g. after a rebuild.
    pub async fn swap(&self, index: Arc<dyn VectorIndex>) {
        let mut active = self.active.write().await;
        *active = index;
        info!("swapped active index");
    }

    /// Synchronously append one uploaded document to the active index.
    ///
    /// The document is chunked, embedded, and added before this returns,
    /// so it is searchable as soon as the upload completes. Returns the
    /// number of chunks added.
    pub async fn ingest_document(&self, document: &Document) -> Result<usize> {
        let chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!(document = %document.id, chunks = 0, "ingested document (empty)");
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.provider.embed_batch(&texts).await?;

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();
        let count = entries.len();

        let index = self.active_index().await;
        index.add(entries).await?;

        info!(document = %document.id, chunks = count, "ingested document");
        Ok(count)
    }

    async fn active_index(&self) -> Arc<dyn VectorIndex> {
        Arc::clone(&*self.active.read().await)
    }
}

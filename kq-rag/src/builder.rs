//! Offline index construction.
//!
//! The [`IndexBuilder`] runs chunker → embedding provider → index for a
//! document collection and persists the result. Builds replace the prior
//! index wholesale; per-document failures are collected and reported
//! without aborting the batch, while a dimension mismatch aborts the whole
//! build before anything is persisted.

use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::chunking::Chunker;
use crate::document::{Chunk, Document, IndexEntry};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::flat::FlatIndex;
use crate::index::{Metric, VectorIndex};
use crate::persist;

/// File extensions picked up by the directory scan.
const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "md"];

const DEFAULT_EMBED_BATCH_SIZE: usize = 32;
const DEFAULT_EMBED_CONCURRENCY: usize = 4;

/// A document that could not be indexed, with the reason.
#[derive(Debug, Clone)]
pub struct BuildFailure {
    /// The document that failed.
    pub document_id: String,
    /// A description of the failure.
    pub message: String,
}

/// Outcome of a batch build: what went in and what was skipped.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Number of documents successfully indexed.
    pub documents_indexed: usize,
    /// Total chunks written to the index.
    pub chunks_indexed: usize,
    /// Documents skipped, with reasons.
    pub failures: Vec<BuildFailure>,
}

/// Builds a [`FlatIndex`] from a document collection.
///
/// Construct one via [`IndexBuilder::builder()`]. Embedding calls are
/// batched and run with bounded concurrency; index mutation stays
/// single-writer so entry order is deterministic.
pub struct IndexBuilder {
    chunker: Arc<dyn Chunker>,
    provider: Arc<dyn EmbeddingProvider>,
    metric: Metric,
    embed_batch_size: usize,
    embed_concurrency: usize,
}

impl IndexBuilder {
    /// Create a new [`IndexBuilderBuilder`].
    pub fn builder() -> IndexBuilderBuilder {
        IndexBuilderBuilder::default()
    }

    /// Scan `data_dir` recursively for text documents.
    ///
    /// Files are visited in sorted order so repeated builds of an
    /// unchanged tree produce identical entry ordering. Unreadable files
    /// become [`BuildFailure`]s rather than aborting the scan.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Ingestion`] if `data_dir` itself does not exist.
    pub fn scan_documents(&self, data_dir: &Path) -> Result<(Vec<Document>, Vec<BuildFailure>)> {
        if !data_dir.is_dir() {
            return Err(RagError::Ingestion {
                document_id: data_dir.display().to_string(),
                message: "data directory not found".to_string(),
            });
        }

        let mut paths: Vec<_> = WalkDir::new(data_dir)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext))
            })
            .map(|entry| entry.into_path())
            .collect();
        paths.sort();

        let mut documents = Vec::new();
        let mut failures = Vec::new();
        for path in paths {
            let id = path
                .strip_prefix(data_dir)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned();
            match std::fs::read_to_string(&path) {
                Ok(text) => documents.push(Document::new(id, text)),
                Err(e) => {
                    warn!(document = %id, error = %e, "skipping unreadable document");
                    failures.push(BuildFailure { document_id: id, message: e.to_string() });
                }
            }
        }
        Ok((documents, failures))
    }

    /// Build a fresh index from the given documents.
    ///
    /// Per-document embedding failures are recorded in the report and the
    /// batch continues.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the provider produces a
    /// vector of the wrong width; the build is aborted at that point.
    pub async fn build(&self, documents: &[Document]) -> Result<(FlatIndex, BuildReport)> {
        let index = FlatIndex::new(self.provider.dimensions(), self.metric);
        let mut report = BuildReport::default();

        for document in documents {
            let chunks = self.chunker.chunk(document);
            if chunks.is_empty() {
                info!(document = %document.id, chunks = 0, "indexed document (empty)");
                report.documents_indexed += 1;
                continue;
            }

            let embeddings = match self.embed_chunks(&chunks).await {
                Ok(embeddings) => embeddings,
                Err(e @ RagError::DimensionMismatch { .. }) => return Err(e),
                Err(e) => {
                    error!(document = %document.id, error = %e, "embedding failed, skipping document");
                    report.failures.push(BuildFailure {
                        document_id: document.id.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let entries: Vec<IndexEntry> = chunks
                .into_iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
                .collect();
            let count = entries.len();

            // Single writer: a mismatch here aborts the build.
            index.add(entries).await?;

            info!(document = %document.id, chunks = count, "indexed document");
            report.documents_indexed += 1;
            report.chunks_indexed += count;
        }

        Ok((index, report))
    }

    /// Scan `data_dir`, build, and persist the index to `index_dir`.
    ///
    /// The new index replaces any previous one at `index_dir` atomically;
    /// nothing is written if the build fails.
    pub async fn build_directory(&self, data_dir: &Path, index_dir: &Path) -> Result<BuildReport> {
        let (documents, scan_failures) = self.scan_documents(data_dir)?;
        let (index, mut report) = self.build(&documents).await?;
        report.failures.splice(0..0, scan_failures);

        persist::save(&index, self.provider.model_id(), index_dir).await?;

        info!(
            documents = report.documents_indexed,
            chunks = report.chunks_indexed,
            failures = report.failures.len(),
            "index build complete"
        );
        Ok(report)
    }

    /// Embed chunk texts in batches with bounded, order-preserving
    /// concurrency.
    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let batches: Vec<Vec<String>> = chunks
            .chunks(self.embed_batch_size)
            .map(|batch| batch.iter().map(|c| c.text.clone()).collect())
            .collect();

        let provider = Arc::clone(&self.provider);
        let results: Vec<Result<Vec<Vec<f32>>>> = stream::iter(batches)
            .map(|batch| {
                let provider = Arc::clone(&provider);
                async move {
                    let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
                    provider.embed_batch(&refs).await
                }
            })
            .buffered(self.embed_concurrency)
            .collect()
            .await;

        let mut embeddings = Vec::with_capacity(chunks.len());
        for result in results {
            embeddings.extend(result?);
        }
        if embeddings.len() != chunks.len() {
            return Err(RagError::Embedding {
                provider: self.provider.model_id().to_string(),
                message: format!(
                    "provider returned {} vectors for {} chunks",
                    embeddings.len(),
                    chunks.len()
                ),
                retryable: false,
            });
        }
        Ok(embeddings)
    }
}

/// Builder for constructing an [`IndexBuilder`].
#[derive(Default)]
pub struct IndexBuilderBuilder {
    chunker: Option<Arc<dyn Chunker>>,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    metric: Option<Metric>,
    embed_batch_size: Option<usize>,
    embed_concurrency: Option<usize>,
}

impl IndexBuilderBuilder {
    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the similarity metric (default cosine).
    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Set the number of chunk texts per embedding call.
    pub fn embed_batch_size(mut self, size: usize) -> Self {
        self.embed_batch_size = Some(size.max(1));
        self
    }

    /// Set the number of embedding calls in flight at once.
    pub fn embed_concurrency(mut self, workers: usize) -> Self {
        self.embed_concurrency = Some(workers.max(1));
        self
    }

    /// Build the [`IndexBuilder`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the chunker or provider is missing.
    pub fn build(self) -> Result<IndexBuilder> {
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;
        let provider =
            self.provider.ok_or_else(|| RagError::Config("provider is required".to_string()))?;

        Ok(IndexBuilder {
            chunker,
            provider,
            metric: self.metric.unwrap_or(Metric::Cosine),
            embed_batch_size: self.embed_batch_size.unwrap_or(DEFAULT_EMBED_BATCH_SIZE),
            embed_concurrency: self.embed_concurrency.unwrap_or(DEFAULT_EMBED_CONCURRENCY),
        })
    }
}

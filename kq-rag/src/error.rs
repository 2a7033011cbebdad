//! Error types for the `kq-rag` crate.

use thiserror::Error;

/// Errors that can occur in the retrieval pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// A document could not be read or processed during a batch build.
    ///
    /// Per-document ingestion failures are collected into the build report
    /// rather than aborting the batch.
    #[error("ingestion failed for document '{document_id}': {message}")]
    Ingestion {
        /// The document that could not be ingested.
        document_id: String,
        /// A description of the failure.
        message: String,
    },

    /// The embedding provider failed to produce vectors.
    #[error("embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
        /// Whether the failure is transient (network fault, rate limit)
        /// and was already retried before being surfaced.
        retryable: bool,
    },

    /// A vector's width does not match the index dimensionality.
    ///
    /// Fatal at build time: the build aborts rather than persisting an
    /// inconsistent index.
    #[error("dimension mismatch: index expects {expected}, got vector of {actual}")]
    DimensionMismatch {
        /// The dimensionality the index was created with.
        expected: usize,
        /// The dimensionality of the offending vector.
        actual: usize,
    },

    /// A persisted index is missing, corrupt, or was built with an
    /// incompatible metric, dimensionality, or embedding model.
    #[error("failed to load index: {0}")]
    IndexLoad(String),

    /// Writing the index to durable storage failed.
    #[error("failed to persist index: {0}")]
    Persist(String),

    /// The query string is empty or otherwise invalid.
    #[error("invalid query: {0}")]
    Query(String),

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;

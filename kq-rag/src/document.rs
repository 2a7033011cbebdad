//! Data types for documents, chunks, index entries, and search results.

use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A source document supplied by the ingestion collaborator.
///
/// The text is already extracted (PDF/OCR handling happens upstream);
/// the retrieval core treats it as read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier, conventionally the source file name.
    pub id: String,
    /// The raw extracted text.
    pub text: String,
    /// When the document entered the pipeline.
    pub ingested_at: DateTime<Utc>,
}

impl Document {
    /// Create a document stamped with the current time.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), ingested_at: Utc::now() }
    }
}

/// A bounded span of text cut from one document, the unit of indexing.
///
/// Chunks are immutable once created. The id is `{document_id}#{seq}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk.
    pub id: String,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Order of this chunk within its document.
    pub seq: usize,
    /// Byte range within the source text. Always aligned to char boundaries.
    pub span: Range<usize>,
    /// The literal text content of the span.
    pub text: String,
}

impl Chunk {
    /// Create a chunk for the given document position.
    pub fn new(document_id: &str, seq: usize, span: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            id: format!("{document_id}#{seq}"),
            document_id: document_id.to_string(),
            seq,
            span,
            text: text.into(),
        }
    }
}

/// A [`Chunk`] paired with its embedding vector, as stored in the index.
///
/// Entries are append-only during a build; the whole index is rebuilt when
/// the source document set changes.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// The chunk metadata and text.
    pub chunk: Chunk,
    /// The embedding vector. Width must equal the index dimensionality.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Chunk`] paired with a similarity score.
///
/// Produced only at query time, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

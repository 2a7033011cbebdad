//! Document chunking.
//!
//! Splits raw document text into overlapping fixed-size passages. The unit
//! of measure is **characters** (Unicode scalar values, not bytes); spans
//! are recorded as byte ranges aligned to char boundaries so that slicing
//! the source text with a chunk's span reproduces the chunk text exactly.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and position metadata but
/// no embeddings; embeddings are attached later by the index builder.
pub trait Chunker: Send + Sync {
    /// Split a document into ordered chunks.
    ///
    /// Returns an empty `Vec` if the document text is empty.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into fixed-size chunks by character count with overlap.
///
/// Consecutive chunks share `chunk_overlap` characters; windows advance by
/// `chunk_size - chunk_overlap`. The final chunk may be shorter than
/// `chunk_size` when the remaining text runs out.
///
/// Whitespace-only chunks are dropped by default. This is the declared
/// filtering policy of the chunker, not a silent behavior; disable it with
/// [`keep_blank`](FixedSizeChunker::keep_blank).
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    skip_blank: bool,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size` (the window would never advance).
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap, skip_blank: true })
    }

    /// Keep whitespace-only chunks instead of filtering them out.
    pub fn keep_blank(mut self) -> Self {
        self.skip_blank = false;
        self
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let text = &document.text;
        // Byte offset of every char boundary, including the end of the text.
        let bounds: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let char_count = bounds.len() - 1;
        let step = self.chunk_size - self.chunk_overlap;

        let mut chunks = Vec::new();
        let mut seq = 0;
        let mut start = 0;

        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            let span = bounds[start]..bounds[end];
            let chunk_text = &text[span.clone()];

            if !self.skip_blank || !chunk_text.trim().is_empty() {
                chunks.push(Chunk::new(&document.id, seq, span, chunk_text));
                seq += 1;
            }

            if end == char_count {
                break;
            }
            start += step;
        }

        chunks
    }
}

//! Retrieval pipeline for the KneadQuality assistant.
//!
//! This crate turns raw documents into a searchable vector index and turns
//! a user query into a ranked list of relevant passages:
//!
//! - [`FixedSizeChunker`] splits document text into overlapping passages
//! - [`EmbeddingProvider`] maps text to fixed-dimension vectors, with a
//!   local deterministic implementation ([`HashEmbeddingProvider`]) and a
//!   remote one ([`OpenAiEmbeddingProvider`])
//! - [`FlatIndex`] stores (vector, chunk) pairs and answers
//!   nearest-neighbor searches with a threshold and top-k cutoff
//! - [`IndexBuilder`] runs the offline batch build and persists the index
//! - [`Retriever`] embeds queries, searches the active index, and supports
//!   single-document scoping and atomic index swaps
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kq_rag::{FixedSizeChunker, HashEmbeddingProvider, IndexBuilder, RagConfig, Retriever};
//!
//! let config = RagConfig::default();
//! let chunker = Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?);
//! let provider = Arc::new(HashEmbeddingProvider::default());
//!
//! let builder = IndexBuilder::builder()
//!     .chunker(chunker.clone())
//!     .provider(provider.clone())
//!     .build()?;
//! let (index, report) = builder.build(&documents).await?;
//!
//! let retriever = Retriever::new(provider, chunker, Arc::new(index), config);
//! let results = retriever.retrieve("What is Six Sigma?", &Default::default()).await?;
//! ```

pub mod builder;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod flat;
pub mod hashing;
pub mod index;
pub mod openai;
pub mod persist;
pub mod retriever;

pub use builder::{BuildFailure, BuildReport, IndexBuilder};
pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, IndexEntry, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use flat::FlatIndex;
pub use hashing::HashEmbeddingProvider;
pub use index::{Metric, SearchOptions, VectorIndex};
pub use openai::OpenAiEmbeddingProvider;
pub use persist::IndexSpec;
pub use retriever::{RetrieveOptions, Retriever};

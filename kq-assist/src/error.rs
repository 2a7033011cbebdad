//! Error types for the `kq-assist` crate.

use thiserror::Error;

/// Errors that can occur while composing answers.
#[derive(Debug, Error)]
pub enum AssistError {
    /// An error propagated from the retrieval pipeline.
    #[error(transparent)]
    Rag(#[from] kq_rag::RagError),
}

/// A convenience result type for assistant operations.
pub type Result<T> = std::result::Result<T, AssistError>;

//! Answer composition for the KneadQuality assistant.
//!
//! This crate sits on top of `kq-rag` and decides how each query gets
//! answered:
//!
//! - [`SmallTalk`] handles greetings and other conversational queries
//!   from canned reply pools
//! - [`KnowledgeBase`] is a static table of quality-management topics
//!   with follow-up questions
//! - [`ToolRecommender`] scores a catalog of quality tools against
//!   tool-seeking queries
//! - [`SessionStore`] keeps a capped in-memory ring of recent turns per
//!   session
//! - [`Assistant`] routes between retrieval, the knowledge table, and a
//!   generic fallback via a pure [`decide`] function, and exposes the
//!   `(query, document scope, session) -> (answer, suggestions)`
//!   interface the chat surface calls
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kq_assist::{AnswerRequest, Assistant};
//!
//! let assistant = Assistant::new(retriever);
//! assistant.ingest_document("sop_1.txt", extracted_text).await?;
//! let response = assistant.answer(&AnswerRequest::new("What is Six Sigma?")).await;
//! println!("{}", response.answer);
//! ```

pub mod composer;
pub mod conversation;
pub mod error;
pub mod knowledge;
pub mod recommend;

pub use composer::{decide, AnswerRequest, AnswerResponse, Assistant, Route};
pub use conversation::{SessionStore, SmallTalk, SmallTalkKind, Turn};
pub use error::{AssistError, Result};
pub use knowledge::{KnowledgeBase, Topic, TopicMatch};
pub use recommend::{QualityTool, ToolRecommendation, ToolRecommender};

//! Answer composition and routing.
//!
//! Every query is answered by exactly one strategy, chosen by a pure
//! decision function: canned small talk, retrieval over the vector index,
//! the static knowledge table, or a generic fallback. Retrieval failures
//! during a live query degrade to the later strategies instead of
//! surfacing a raw error to the user.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use kq_rag::{Document, RetrieveOptions, Retriever, SearchResult};

use crate::conversation::{SessionStore, SmallTalk, SmallTalkKind, Turn};
use crate::error::Result;
use crate::knowledge::KnowledgeBase;
use crate::recommend::{ToolRecommendation, ToolRecommender};

/// The strategy that produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Canned conversational reply.
    SmallTalk,
    /// Quality-tool suggestions from the static catalog.
    ToolRecommendation,
    /// Synthesis from retrieved passages.
    Retrieval,
    /// Static knowledge-table answer.
    Knowledge,
    /// Generic "no information" response.
    Fallback,
}

/// A user query plus optional scoping and session context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// The question text.
    pub query: String,
    /// Restrict retrieval to one uploaded document.
    pub document_id: Option<String>,
    /// Session identifier for multi-turn context.
    pub session_id: Option<String>,
}

impl AnswerRequest {
    /// A plain unscoped, sessionless request.
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), document_id: None, session_id: None }
    }
}

/// The composed answer returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// The answer text.
    pub answer: String,
    /// Follow-up questions worth asking next.
    pub suggested_questions: Vec<String>,
    /// Short reply prompts for the conversational surface.
    pub suggested_replies: Vec<String>,
    /// Which strategy produced the answer.
    pub route: Route,
}

const SUGGESTED_REPLIES: &[&str] = &["Tell me more", "Show me an example", "How do I get started?"];

/// How many tools a recommendation answer lists.
const RECOMMENDED_TOOLS: usize = 3;

const GENERIC_QUESTIONS: &[&str] = &[
    "What are the 7 QC tools?",
    "What is Six Sigma?",
    "How do I run a root cause analysis?",
    "What is the PDCA cycle?",
];

/// Choose the answering strategy.
///
/// Small talk wins outright; a tool-seeking query with at least one
/// catalog recommendation comes next; otherwise retrieval is preferred
/// when the best score clears the threshold, then the static table, then
/// the fallback.
pub fn decide(
    small_talk: Option<SmallTalkKind>,
    tool_recommended: bool,
    best_score: Option<f32>,
    threshold: f32,
    topic_matched: bool,
) -> Route {
    if small_talk.is_some() {
        Route::SmallTalk
    } else if tool_recommended {
        Route::ToolRecommendation
    } else if best_score.is_some_and(|score| score >= threshold) {
        Route::Retrieval
    } else if topic_matched {
        Route::Knowledge
    } else {
        Route::Fallback
    }
}

/// The conversational assistant facade.
///
/// Wires the retriever, the static knowledge table, the tool
/// recommender, small-talk handling, and per-session state into one
/// `answer` entry point.
pub struct Assistant {
    retriever: Arc<Retriever>,
    knowledge: KnowledgeBase,
    recommender: ToolRecommender,
    small_talk: SmallTalk,
    sessions: SessionStore,
}

impl Assistant {
    /// Create an assistant over the given retriever with the built-in
    /// knowledge table.
    pub fn new(retriever: Arc<Retriever>) -> Self {
        Self {
            retriever,
            knowledge: KnowledgeBase::new(),
            recommender: ToolRecommender::new(),
            small_talk: SmallTalk::default(),
            sessions: SessionStore::default(),
        }
    }

    /// The per-session conversation state.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Answer one query.
    ///
    /// Never returns an error to the caller: empty queries get a
    /// clarifying response and retrieval failures degrade to the
    /// knowledge table or the generic fallback.
    pub async fn answer(&self, request: &AnswerRequest) -> AnswerResponse {
        let query = request.query.trim();
        let turn_count = match &request.session_id {
            Some(id) => self.sessions.turn_count(id).await,
            None => 0,
        };

        let response = if query.is_empty() {
            AnswerResponse {
                answer: "I didn't catch a question there. What would you like to know?"
                    .to_string(),
                suggested_questions: strings(GENERIC_QUESTIONS),
                suggested_replies: strings(SUGGESTED_REPLIES),
                route: Route::Fallback,
            }
        } else {
            self.compose(query, request.document_id.clone(), turn_count).await
        };

        if let Some(session_id) = &request.session_id {
            self.sessions
                .record(
                    session_id,
                    Turn {
                        query: query.to_string(),
                        answer: response.answer.clone(),
                        route: response.route,
                        asked_at: chrono::Utc::now(),
                    },
                )
                .await;
        }

        info!(route = ?response.route, "answered query");
        response
    }

    /// Ingest one uploaded document so it is searchable before the upload
    /// is reported as complete. Returns the number of indexed chunks.
    pub async fn ingest_document(&self, document_id: &str, text: &str) -> Result<usize> {
        let document = Document::new(document_id, text);
        Ok(self.retriever.ingest_document(&document).await?)
    }

    async fn compose(
        &self,
        query: &str,
        document_id: Option<String>,
        turn_count: usize,
    ) -> AnswerResponse {
        let small_talk = self.small_talk.detect(query);
        let topic_match = self.knowledge.lookup(query);
        let recommendations = if small_talk.is_none() && self.recommender.seeks_tool(query) {
            self.recommender.recommend(query, RECOMMENDED_TOOLS)
        } else {
            Vec::new()
        };

        // A retrieval failure must not break the conversation; degrade to
        // the static strategies with empty results.
        let results = if small_talk.is_some() || !recommendations.is_empty() {
            Vec::new()
        } else {
            let options = RetrieveOptions { document_id, ..RetrieveOptions::default() };
            match self.retriever.retrieve(query, &options).await {
                Ok(results) => results,
                Err(e) => {
                    warn!(error = %e, "retrieval failed, degrading to static answer");
                    Vec::new()
                }
            }
        };

        let threshold = self.retriever.config().score_threshold;
        let best_score = results.first().map(|r| r.score);
        let route = decide(
            small_talk,
            !recommendations.is_empty(),
            best_score,
            threshold,
            topic_match.is_some(),
        );

        let answer = match route {
            Route::SmallTalk => {
                // `decide` only picks SmallTalk when the detector matched.
                let kind = small_talk.unwrap_or(SmallTalkKind::Greeting);
                self.small_talk.reply(kind, turn_count).to_string()
            }
            Route::ToolRecommendation => format_recommendations(&recommendations),
            Route::Retrieval => format_passages(&results),
            Route::Knowledge => {
                let topic = topic_match.as_ref().map(|m| m.topic);
                match topic {
                    Some(topic) => format!("{}\n\n{}", topic.title, topic.body),
                    None => fallback_answer(),
                }
            }
            Route::Fallback => fallback_answer(),
        };

        let suggested_questions = match &topic_match {
            Some(m) => strings(m.topic.follow_ups),
            None => strings(GENERIC_QUESTIONS),
        };

        AnswerResponse {
            answer,
            suggested_questions,
            suggested_replies: strings(SUGGESTED_REPLIES),
            route,
        }
    }
}

fn fallback_answer() -> String {
    "I don't have information on that in the knowledge base yet. Try rephrasing the \
     question, or upload a relevant document and ask again."
        .to_string()
}

/// Format tool recommendations with their catalog context.
fn format_recommendations(recommendations: &[ToolRecommendation<'_>]) -> String {
    let mut answer = String::from("These quality tools fit your situation best:\n");
    for (i, rec) in recommendations.iter().enumerate() {
        let tool = rec.tool;
        answer.push_str(&format!(
            "\n{}. {} ({})\n   Complexity: {} | Lead time: {}\n   {}\n   Benefits: {}\n",
            i + 1,
            tool.name,
            tool.category,
            tool.complexity,
            tool.lead_time,
            tool.description,
            tool.benefits.join(", ")
        ));
    }
    answer
}

/// Format retrieved passages with their sources and relevance scores.
fn format_passages(results: &[SearchResult]) -> String {
    let mut answer = String::from("Here's what the indexed documents say:\n");
    for (i, result) in results.iter().enumerate() {
        answer.push_str(&format!(
            "\n[{}] {} (relevance {:.3})\n{}\n",
            i + 1,
            result.chunk.document_id,
            result.score,
            result.chunk.text.trim()
        ));
    }
    answer
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

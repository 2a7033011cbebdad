//! End-to-end tests for the assistant over a small indexed corpus.

use std::sync::Arc;

use kq_assist::{AnswerRequest, Assistant, Route};
use kq_rag::{
    Document, FixedSizeChunker, HashEmbeddingProvider, IndexBuilder, RagConfig, Retriever,
};

async fn assistant_over_corpus() -> Assistant {
    let config = RagConfig::builder().chunk_size(200).chunk_overlap(20).build().unwrap();
    let provider = Arc::new(HashEmbeddingProvider::default());
    let chunker =
        Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap).unwrap());

    let documents = vec![
        Document::new(
            "six_sigma.txt",
            "Six Sigma is a data-driven method for process improvement",
        ),
        Document::new(
            "audits.txt",
            "Internal audits verify that procedures match the documented quality system",
        ),
    ];

    let builder = IndexBuilder::builder()
        .chunker(chunker.clone())
        .provider(provider.clone())
        .build()
        .unwrap();
    let (index, report) = builder.build(&documents).await.unwrap();
    assert!(report.failures.is_empty());

    Assistant::new(Arc::new(Retriever::new(provider, chunker, Arc::new(index), config)))
}

#[tokio::test]
async fn indexed_topic_is_answered_from_retrieval() {
    let assistant = assistant_over_corpus().await;
    let response = assistant.answer(&AnswerRequest::new("What is Six Sigma?")).await;

    assert_eq!(response.route, Route::Retrieval);
    assert!(response.answer.contains("six_sigma.txt"));
    assert!(response.answer.contains("data-driven"));
    // The knowledge table still supplies topical follow-ups.
    assert!(!response.suggested_questions.is_empty());
    assert!(!response.suggested_replies.is_empty());
}

#[tokio::test]
async fn unmatched_scope_falls_back_to_the_knowledge_table() {
    let assistant = assistant_over_corpus().await;
    let request = AnswerRequest {
        query: "What is Six Sigma?".to_string(),
        document_id: Some("never_uploaded.txt".to_string()),
        session_id: None,
    };
    let response = assistant.answer(&request).await;

    // No passages in scope, but the static table knows the topic.
    assert_eq!(response.route, Route::Knowledge);
    assert!(response.answer.contains("DMAIC"));
}

#[tokio::test]
async fn tool_seeking_query_gets_catalog_recommendations() {
    let assistant = assistant_over_corpus().await;
    let response =
        assistant.answer(&AnswerRequest::new("Which tools should I use to reduce defects?")).await;

    assert_eq!(response.route, Route::ToolRecommendation);
    assert!(response.answer.contains("Pareto"));
    assert!(response.answer.contains("Complexity:"));
}

#[tokio::test]
async fn tool_seeking_query_off_domain_still_falls_back() {
    let assistant = assistant_over_corpus().await;
    // "recommend" marks this as tool-seeking, but nothing in the catalog
    // matches, so the route degrades normally.
    let response =
        assistant.answer(&AnswerRequest::new("recommend a good espresso machine")).await;
    assert_eq!(response.route, Route::Fallback);
}

#[tokio::test]
async fn unknown_topic_gets_the_generic_fallback() {
    let assistant = assistant_over_corpus().await;
    let response =
        assistant.answer(&AnswerRequest::new("recommend a sourdough starter schedule")).await;

    assert_eq!(response.route, Route::Fallback);
    assert!(response.answer.contains("don't have information"));
    assert!(!response.suggested_questions.is_empty());
}

#[tokio::test]
async fn empty_query_gets_a_clarifying_answer() {
    let assistant = assistant_over_corpus().await;
    let response = assistant.answer(&AnswerRequest::new("   ")).await;

    assert_eq!(response.route, Route::Fallback);
    assert!(response.answer.contains("didn't catch a question"));
}

#[tokio::test]
async fn greetings_are_answered_without_retrieval() {
    let assistant = assistant_over_corpus().await;
    let response = assistant.answer(&AnswerRequest::new("Hello!")).await;

    assert_eq!(response.route, Route::SmallTalk);
    assert!(!response.answer.is_empty());
}

#[tokio::test]
async fn uploaded_document_is_searchable_in_scope_immediately() {
    let assistant = assistant_over_corpus().await;
    let chunks = assistant
        .ingest_document(
            "upload_7.txt",
            "The calibration log must be signed after every instrument check",
        )
        .await
        .unwrap();
    assert!(chunks > 0);

    let request = AnswerRequest {
        query: "Who signs the calibration log after an instrument check?".to_string(),
        document_id: Some("upload_7.txt".to_string()),
        session_id: None,
    };
    let response = assistant.answer(&request).await;
    assert_eq!(response.route, Route::Retrieval);
    assert!(response.answer.contains("upload_7.txt"));
}

#[tokio::test]
async fn turns_are_recorded_per_session() {
    let assistant = assistant_over_corpus().await;
    let request = AnswerRequest {
        query: "What is Six Sigma?".to_string(),
        document_id: None,
        session_id: Some("session-1".to_string()),
    };

    assistant.answer(&request).await;
    assistant.answer(&request).await;

    let turns = assistant.sessions().recent("session-1").await;
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].query, "What is Six Sigma?");
    assert_eq!(turns[0].route, Route::Retrieval);
    assert!(assistant.sessions().recent("other").await.is_empty());
}

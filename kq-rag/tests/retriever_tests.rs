//! Retriever behavior and search-ordering property tests.

use std::sync::Arc;

use kq_rag::{
    Chunk, Chunker, Document, EmbeddingProvider, FixedSizeChunker, FlatIndex,
    HashEmbeddingProvider, IndexEntry, Metric, RagConfig, RagError, RetrieveOptions, Retriever,
    SearchOptions, SearchResult, VectorIndex,
};
use proptest::prelude::*;

fn retriever_over(index: FlatIndex, threshold: f32) -> Retriever {
    let provider = Arc::new(HashEmbeddingProvider::new(index.dimensions()));
    let chunker = Arc::new(FixedSizeChunker::new(200, 20).unwrap());
    let config = RagConfig::builder().score_threshold(threshold).build().unwrap();
    Retriever::new(provider, chunker, Arc::new(index), config)
}

async fn corpus_index(dim: usize) -> FlatIndex {
    let provider = HashEmbeddingProvider::new(dim);
    let chunker = FixedSizeChunker::new(200, 20).unwrap();
    let index = FlatIndex::new(dim, Metric::Cosine);

    let documents = [
        Document::new(
            "six_sigma.txt",
            "Six Sigma is a data-driven method for process improvement",
        ),
        Document::new(
            "pdca.txt",
            "The PDCA cycle repeats plan, do, check, and act until the process stabilizes",
        ),
    ];
    for document in &documents {
        for chunk in chunker.chunk(document) {
            let embedding = provider.embed(&chunk.text).await.unwrap();
            index.add(vec![IndexEntry { chunk, embedding }]).await.unwrap();
        }
    }
    index
}

#[tokio::test]
async fn six_sigma_query_returns_the_six_sigma_chunk_on_top() {
    let retriever = retriever_over(corpus_index(384).await, 0.35);
    let results = retriever.retrieve("What is Six Sigma?", &RetrieveOptions::default()).await.unwrap();

    assert!(!results.is_empty());
    assert_eq!(results[0].chunk.document_id, "six_sigma.txt");
    assert!(results[0].score > 0.5);
}

#[tokio::test]
async fn empty_query_is_rejected() {
    let retriever = retriever_over(corpus_index(64).await, 0.0);
    for query in ["", "   ", "\n\t"] {
        let err = retriever.retrieve(query, &RetrieveOptions::default()).await.unwrap_err();
        assert!(matches!(err, RagError::Query(_)));
    }
}

#[tokio::test]
async fn unknown_document_scope_returns_empty() {
    let retriever = retriever_over(corpus_index(64).await, 0.0);
    let results = retriever
        .retrieve("process improvement", &RetrieveOptions::scoped_to("never_uploaded.txt"))
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn scope_restricts_results_to_one_document() {
    let retriever = retriever_over(corpus_index(64).await, 0.0);
    let results = retriever
        .retrieve("process", &RetrieveOptions::scoped_to("pdca.txt"))
        .await
        .unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.chunk.document_id == "pdca.txt"));
}

#[tokio::test]
async fn ingested_document_is_searchable_immediately() {
    let retriever = retriever_over(FlatIndex::new(384, Metric::Cosine), 0.2);
    assert_eq!(retriever.index_len().await, 0);

    let uploaded = Document::new(
        "upload_1.txt",
        "A fishbone diagram organizes candidate root causes by category",
    );
    let added = retriever.ingest_document(&uploaded).await.unwrap();
    assert!(added > 0);
    assert_eq!(retriever.index_len().await, added);

    let results = retriever
        .retrieve("fishbone diagram root causes", &RetrieveOptions::scoped_to("upload_1.txt"))
        .await
        .unwrap();
    assert_eq!(results[0].chunk.document_id, "upload_1.txt");
}

#[tokio::test]
async fn swap_replaces_the_active_index() {
    let retriever = retriever_over(corpus_index(64).await, 0.0);
    assert!(retriever.index_len().await > 0);

    retriever.swap(Arc::new(FlatIndex::new(64, Metric::Cosine))).await;
    assert_eq!(retriever.index_len().await, 0);
    let results =
        retriever.retrieve("six sigma", &RetrieveOptions::default()).await.unwrap();
    assert!(results.is_empty());
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

fn arb_entry(dim: usize) -> impl Strategy<Value = IndexEntry> {
    ("[a-c]\\.txt", 0usize..50, arb_normalized_embedding(dim)).prop_map(
        |(document_id, seq, embedding)| IndexEntry {
            chunk: Chunk::new(&document_id, seq, 0..0, "passage"),
            embedding,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Search results are ordered by non-increasing score, all meet the
    /// threshold, and at most top_k come back.
    #[test]
    fn search_ordering_threshold_and_cap_hold(
        entries in proptest::collection::vec(arb_entry(16), 1..24),
        query in arb_normalized_embedding(16),
        top_k in 1usize..30,
        threshold in 0.0f32..0.8,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let results: Vec<SearchResult> = rt.block_on(async {
            let index = FlatIndex::new(16, Metric::Cosine);
            index.add(entries.clone()).await.unwrap();
            index
                .search(&query, &SearchOptions { top_k, threshold, document_id: None })
                .await
                .unwrap()
        });

        prop_assert!(results.len() <= top_k);
        prop_assert!(results.len() <= entries.len());
        for result in &results {
            prop_assert!(result.score >= threshold);
        }
        for window in results.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "results not in non-increasing order: {} < {}",
                window[0].score,
                window[1].score,
            );
        }
    }
}

//! Remote embedding provider backed by the OpenAI embeddings API.
//!
//! Carries a request timeout and a bounded retry with exponential backoff:
//! transport faults, 429, and 5xx responses are retried, other client
//! errors are surfaced immediately.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const DEFAULT_MODEL: &str = "text-embedding-3-small";
const DEFAULT_DIMENSIONS: usize = 1536;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_millis(200);

/// An [`EmbeddingProvider`] calling the `/v1/embeddings` endpoint.
///
/// Empty inputs are never sent to the API; per the trait's empty-string
/// policy they embed as all-zero vectors locally.
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
    max_attempts: u32,
}

impl OpenAiEmbeddingProvider {
    /// Create a provider with the given API key and the default model.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] if the key is empty or the HTTP
    /// client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(embedding_err("API key must not be empty", false));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| embedding_err(format!("failed to build HTTP client: {e}"), false))?;

        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Create a provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| embedding_err("OPENAI_API_KEY environment variable not set", false))?;
        Self::new(api_key)
    }

    /// Set the model name and its native dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Set the maximum number of attempts per batch (minimum 1).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    async fn request_embeddings(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        let body = EmbeddingRequest { model: &self.model, input: inputs };

        let mut last_failure = String::new();
        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying embeddings request");
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(EMBEDDINGS_URL)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    last_failure = format!("request failed: {e}");
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                let parsed: EmbeddingResponse = response
                    .json()
                    .await
                    .map_err(|e| embedding_err(format!("failed to parse response: {e}"), false))?;
                let vectors: Vec<Vec<f32>> =
                    parsed.data.into_iter().map(|d| d.embedding).collect();
                if vectors.len() != inputs.len() {
                    return Err(embedding_err(
                        format!("API returned {} vectors for {} inputs", vectors.len(), inputs.len()),
                        false,
                    ));
                }
                return Ok(vectors);
            }

            let detail = response
                .text()
                .await
                .ok()
                .and_then(|body| serde_json::from_str::<ErrorResponse>(&body).ok())
                .map(|e| e.error.message)
                .unwrap_or_default();

            if status.as_u16() == 429 || status.is_server_error() {
                last_failure = format!("API returned {status}: {detail}");
                continue;
            }

            error!(provider = "OpenAI", %status, "API error");
            return Err(embedding_err(format!("API returned {status}: {detail}"), false));
        }

        error!(provider = "OpenAI", attempts = self.max_attempts, "giving up on embeddings request");
        Err(embedding_err(
            format!("gave up after {} attempts: {last_failure}", self.max_attempts),
            true,
        ))
    }
}

/// Exponential backoff for retry `attempt` (1-based), capped so the
/// exponent cannot overflow however large `max_attempts` is configured.
fn backoff_delay(attempt: u32) -> Duration {
    BACKOFF_BASE * 2u32.pow(attempt.saturating_sub(1).min(10))
}

fn embedding_err(message: impl Into<String>, retryable: bool) -> RagError {
    RagError::Embedding { provider: "OpenAI".to_string(), message: message.into(), retryable }
}

// Wire types for the embeddings endpoint.

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| embedding_err("API returned empty response", false))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "OpenAI", batch_size = texts.len(), model = %self.model, "embedding batch");

        // Empty strings are embedded locally as zero vectors; only the
        // non-empty inputs go to the API.
        let non_empty: Vec<&str> = texts.iter().copied().filter(|t| !t.is_empty()).collect();
        let remote_vectors = if non_empty.is_empty() {
            Vec::new()
        } else {
            self.request_embeddings(&non_empty).await?
        };
        let mut remote = remote_vectors.into_iter();

        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            if text.is_empty() {
                vectors.push(vec![0.0; self.dimensions]);
            } else {
                vectors.push(remote.next().ok_or_else(|| {
                    embedding_err("API returned fewer vectors than inputs", false)
                })?);
            }
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

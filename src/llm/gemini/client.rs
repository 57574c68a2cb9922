// src/llm/gemini/client.rs
// Google Gemini API client (single-shot and SSE streaming)

use async_trait::async_trait;
use futures::StreamExt;
use std::time::Instant;
use tracing::{Span, debug, info, instrument, warn};
use uuid::Uuid;

use super::types::{GeminiRequest, GeminiResponse, GenerationConfig};
use crate::error::{ExplainerError, Result};
use crate::llm::http_client::create_shared_client;
use crate::llm::provider::{FragmentStream, TextGenerator};
use crate::stream::SseParser;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Sampling parameters; fixed, not exposed to end users
pub const GENERATION_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.7,
    top_p: 0.95,
    top_k: 40,
    max_output_tokens: 2048,
};

/// Google Gemini API client
pub struct GeminiClient {
    api_key: String,
    model: String,
    api_base: String,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client with default model
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    /// Create a new Gemini client with custom model
    pub fn with_model(api_key: String, model: String) -> Self {
        Self::with_http_client(api_key, model, create_shared_client())
    }

    /// Create a new Gemini client with a shared HTTP client
    pub fn with_http_client(api_key: String, model: String, http: reqwest::Client) -> Self {
        Self {
            api_key,
            model,
            api_base: GEMINI_API_BASE.to_string(),
            http,
        }
    }

    /// Point the client at a different API root (self-hosted gateways, tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Endpoint URL; the key goes in `API_KEY_HEADER`, never the query
    fn url(&self, method: &str) -> String {
        let url = format!("{}/{}:{}", self.api_base, self.model, method);
        if method == "streamGenerateContent" {
            format!("{}?alt=sse", url)
        } else {
            url
        }
    }

    async fn send(&self, method: &str, prompt: &str) -> Result<reqwest::Response> {
        let request = GeminiRequest::from_prompt(prompt, GENERATION_CONFIG);
        let response = self
            .http
            .post(self.url(method))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExplainerError::Llm(format!(
                "Gemini API error: {} - {}",
                status, body
            )));
        }
        Ok(response)
    }
}

/// Text carried by one streamed chunk. Unparsable chunks are skipped.
fn chunk_text(request_id: &str, payload: &str) -> Result<Option<String>> {
    let chunk: GeminiResponse = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            debug!(request_id, error = %e, "Skipping unparsable Gemini chunk");
            return Ok(None);
        }
    };
    if let Some(error) = chunk.error {
        return Err(ExplainerError::Llm(format!("Gemini error: {}", error.message)));
    }
    Ok(chunk.text().filter(|t| !t.is_empty()))
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip(self, prompt), fields(request_id, model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request_id = Uuid::new_v4().to_string();
        let start_time = Instant::now();
        Span::current().record("request_id", &request_id);

        info!(request_id = %request_id, prompt_chars = prompt.len(), "Starting Gemini request");

        let body = self.send("generateContent", prompt).await?.text().await?;
        let data: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| ExplainerError::Llm(format!("Failed to parse Gemini response: {}", e)))?;

        if let Some(error) = data.error {
            return Err(ExplainerError::Llm(format!("Gemini error: {}", error.message)));
        }
        let text = data
            .text()
            .ok_or_else(|| ExplainerError::Llm("Gemini returned no candidates".to_string()))?;

        info!(
            request_id = %request_id,
            duration_ms = start_time.elapsed().as_millis() as u64,
            content_len = text.len(),
            "Gemini request complete"
        );
        Ok(text)
    }

    #[instrument(skip(self, prompt), fields(request_id, model = %self.model))]
    async fn generate_stream(&self, prompt: &str) -> Result<FragmentStream> {
        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", &request_id);

        info!(request_id = %request_id, prompt_chars = prompt.len(), "Starting Gemini stream");

        let response = self.send("streamGenerateContent", prompt).await?;
        let mut bytes = response.bytes_stream();

        let stream: FragmentStream = Box::pin(async_stream::try_stream! {
            let mut parser = SseParser::new();
            let mut fragments = 0usize;

            while let Some(chunk) = bytes.next().await {
                let chunk = chunk?;
                for payload in parser.feed(&chunk) {
                    if let Some(text) = chunk_text(&request_id, &payload)? {
                        fragments += 1;
                        yield text;
                    }
                }
            }

            if parser.pending() > 0 {
                match parser.finish() {
                    Some(payload) => {
                        if let Some(text) = chunk_text(&request_id, &payload)? {
                            fragments += 1;
                            yield text;
                        }
                    }
                    None => warn!(request_id = %request_id, "Gemini stream ended with unparsed data"),
                }
            }

            info!(request_id = %request_id, fragments, "Gemini stream complete");
        });

        Ok(stream)
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}

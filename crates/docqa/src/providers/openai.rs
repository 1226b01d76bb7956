//! OpenAI-compatible API client for embeddings and chat completions

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;
use super::retry::with_backoff;

/// OpenAI-compatible API client with automatic retry
pub struct OpenAiClient {
    /// HTTP client
    client: Client,
    /// LLM configuration (base URL, key, chat model)
    config: LlmConfig,
    /// Embedding model name
    embed_model: String,
}

#[derive(Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a new client
    pub fn new(llm: &LlmConfig, embedding: &EmbeddingConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config: llm.clone(),
            embed_model: embedding.model.clone(),
        }
    }

    /// Check if the API is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.config.base_url);

        match self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generate embeddings for a batch of texts, order-preserving
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.config.base_url);
        let texts = texts.to_vec();
        let model = self.embed_model.clone();
        let api_key = self.config.api_key.clone();
        let client = self.client.clone();
        let expected = texts.len();

        with_backoff(self.config.max_retries, || {
            let url = url.clone();
            let texts = texts.clone();
            let model = model.clone();
            let api_key = api_key.clone();
            let client = client.clone();

            async move {
                let request = EmbeddingsRequest {
                    model,
                    input: texts,
                };

                let response = client
                    .post(&url)
                    .bearer_auth(&api_key)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::embedding(format!(
                        "Embedding failed: HTTP {} - {}",
                        status, body
                    )));
                }

                let mut parsed: EmbeddingsResponse = response.json().await.map_err(|e| {
                    Error::embedding(format!("Failed to parse embedding response: {}", e))
                })?;

                if parsed.data.len() != expected {
                    return Err(Error::embedding(format!(
                        "Embedding count mismatch: sent {}, received {}",
                        expected,
                        parsed.data.len()
                    )));
                }

                // The API is order-preserving but carries indices; honor them
                parsed.data.sort_by_key(|d| d.index);
                Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
            }
        })
        .await
    }

    /// Generate a single embedding
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| Error::embedding("empty embedding response"))
    }

    /// Send a chat completion request
    pub async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: user.to_string(),
            },
        ];
        let model = self.config.chat_model.clone();
        let temperature = self.config.temperature;
        let max_tokens = self.config.max_tokens;
        let api_key = self.config.api_key.clone();
        let client = self.client.clone();

        with_backoff(self.config.max_retries, || {
            let url = url.clone();
            let messages = messages.clone();
            let model = model.clone();
            let api_key = api_key.clone();
            let client = client.clone();

            async move {
                let request = ChatRequest {
                    model,
                    messages,
                    temperature,
                    max_tokens,
                };

                let response = client
                    .post(&url)
                    .bearer_auth(&api_key)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::llm(format!("Chat request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::llm(format!(
                        "Chat completion failed: HTTP {} - {}",
                        status, body
                    )));
                }

                let parsed: ChatResponse = response.json().await.map_err(|e| {
                    Error::llm(format!("Failed to parse chat response: {}", e))
                })?;

                let content = parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .unwrap_or_default();

                Ok(content)
            }
        })
        .await
    }
}

/// Embedding provider backed by the OpenAI-compatible embeddings endpoint
pub struct OpenAiEmbedder {
    client: Arc<OpenAiClient>,
    dimensions: usize,
}

impl OpenAiEmbedder {
    /// Create from an existing client
    pub fn from_client(client: Arc<OpenAiClient>, dimensions: usize) -> Self {
        Self { client, dimensions }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.client.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// LLM provider backed by the OpenAI-compatible chat endpoint
pub struct OpenAiChat {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiChat {
    /// Create from an existing client
    pub fn from_client(client: Arc<OpenAiClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl LlmProvider for OpenAiChat {
    async fn generate_answer(&self, question: &str, context: &str) -> Result<String> {
        let prompt = PromptBuilder::build_concise_prompt(question, context);
        self.client.chat(PromptBuilder::system_prompt(), &prompt).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Combined provider sharing a single client for embeddings and chat
pub struct OpenAiProvider {
    embedder: OpenAiEmbedder,
    llm: OpenAiChat,
}

impl OpenAiProvider {
    /// Create a new combined provider
    pub fn new(llm: &LlmConfig, embedding: &EmbeddingConfig) -> Self {
        let client = Arc::new(OpenAiClient::new(llm, embedding));
        Self {
            embedder: OpenAiEmbedder::from_client(Arc::clone(&client), embedding.dimensions),
            llm: OpenAiChat::from_client(client, llm.chat_model.clone()),
        }
    }

    /// Split into separate providers
    pub fn split(self) -> (OpenAiEmbedder, OpenAiChat) {
        (self.embedder, self.llm)
    }
}

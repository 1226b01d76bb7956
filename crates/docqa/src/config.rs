//! Configuration for the document QA service

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocQaConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Document download configuration
    #[serde(default)]
    pub download: DownloadConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Vector index configuration
    #[serde(default)]
    pub vector_index: VectorIndexConfig,
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Answering orchestration configuration
    #[serde(default)]
    pub answering: AnsweringConfig,
}

impl DocQaConfig {
    /// Load configuration: optional TOML file, then environment overrides
    /// for secrets and endpoints.
    ///
    /// The file path comes from `DOCQA_CONFIG`, falling back to `docqa.toml`
    /// in the working directory when present.
    pub fn load() -> Result<Self> {
        let path = std::env::var("DOCQA_CONFIG").unwrap_or_else(|_| "docqa.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path, e)))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (secrets never live in the file)
    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("BEARER_TOKEN") {
            self.server.bearer_token = token;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.llm.api_key = key;
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Ok(key) = std::env::var("PINECONE_API_KEY") {
            self.vector_index.api_key = key;
        }
        if let Ok(host) = std::env::var("PINECONE_INDEX_HOST") {
            self.vector_index.index_host = host;
        }
    }

    /// Validate that required secrets are present
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.is_empty() {
            return Err(Error::Config(
                "LLM API key is not set (OPENAI_API_KEY)".to_string(),
            ));
        }
        if self.vector_index.index_host.is_empty() {
            return Err(Error::Config(
                "Vector index host is not set (PINECONE_INDEX_HOST)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Bearer token required on the query endpoint
    pub bearer_token: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            bearer_token: String::new(),
        }
    }
}

/// Document download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum document size in bytes (default: 50MB)
    pub max_size: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            max_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
    /// Minimum chunk size (whitespace-only stubs are dropped)
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
            min_chunk_size: 1,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions (1536 for text-embedding-ada-002)
    pub dimensions: usize,
    /// Number of texts per embedding request
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-ada-002".to_string(),
            dimensions: 1536,
            batch_size: 64,
        }
    }
}

/// Vector index (Pinecone) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexConfig {
    /// Index host, e.g. "my-index-abc123.svc.us-east1-gcp.pinecone.io"
    pub index_host: String,
    /// API key (from PINECONE_API_KEY)
    #[serde(skip_serializing)]
    #[serde(default)]
    pub api_key: String,
    /// Namespace prefix for per-request namespaces
    pub namespace_prefix: String,
    /// Records per upsert request (Pinecone caps at 100)
    pub upsert_batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            index_host: String::new(),
            api_key: String::new(),
            namespace_prefix: "req".to_string(),
            upsert_batch_size: 100,
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

/// LLM (chat completion + embeddings) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// API key (from OPENAI_API_KEY)
    #[serde(skip_serializing)]
    #[serde(default)]
    pub api_key: String,
    /// Chat model name
    pub chat_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum completion tokens
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            chat_model: "gpt-4.1-nano".to_string(),
            temperature: 1.0,
            max_tokens: 800,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Answering orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnsweringConfig {
    /// Maximum questions answered concurrently
    pub max_concurrent_questions: usize,
    /// Dense candidates fetched on the first pass
    pub first_pass_top_k: usize,
    /// Merged context chunks kept on the first pass
    pub first_pass_chunks: usize,
    /// Dense candidates fetched on the widened retry
    pub retry_top_k: usize,
    /// Merged context chunks kept on the widened retry
    pub retry_chunks: usize,
}

impl Default for AnsweringConfig {
    fn default() -> Self {
        Self {
            max_concurrent_questions: 4,
            first_pass_top_k: 8,
            first_pass_chunks: 4,
            retry_top_k: 16,
            retry_chunks: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = DocQaConfig::default();
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 100);
        assert_eq!(config.answering.first_pass_top_k, 8);
        assert_eq!(config.answering.retry_top_k, 16);
        assert_eq!(config.vector_index.upsert_batch_size, 100);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: DocQaConfig = toml::from_str(
            r#"
            [chunking]
            chunk_size = 1200
            chunk_overlap = 200
            min_chunk_size = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.chunking.chunk_size, 1200);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.chat_model, "gpt-4.1-nano");
    }

    #[test]
    fn test_validate_requires_secrets() {
        let config = DocQaConfig::default();
        assert!(config.validate().is_err());

        let mut config = DocQaConfig::default();
        config.llm.api_key = "sk-test".to_string();
        config.vector_index.index_host = "idx.example.io".to_string();
        assert!(config.validate().is_ok());
    }
}

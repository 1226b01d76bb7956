//! Application state for the QA server

use std::sync::Arc;
use uuid::Uuid;

use crate::answering::AnsweringOrchestrator;
use crate::config::DocQaConfig;
use crate::error::Result;
use crate::ingestion::DocumentFetcher;
use crate::providers::{
    openai::OpenAiProvider, pinecone::PineconeIndex, EmbeddingProvider, LlmProvider,
    VectorIndexProvider,
};
use crate::retrieval::HybridRetriever;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: DocQaConfig,
    /// Document fetcher
    fetcher: DocumentFetcher,
    /// Embedding provider
    embedder: Arc<dyn EmbeddingProvider>,
    /// LLM provider
    llm: Arc<dyn LlmProvider>,
    /// Vector index provider
    index: Arc<dyn VectorIndexProvider>,
    /// Answering orchestrator
    orchestrator: AnsweringOrchestrator,
}

impl AppState {
    /// Create new application state with hosted providers
    pub fn new(config: DocQaConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let fetcher = DocumentFetcher::new(&config.download)?;

        let (embedder, llm) = OpenAiProvider::new(&config.llm, &config.embedding).split();
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder);
        let llm: Arc<dyn LlmProvider> = Arc::new(llm);
        tracing::info!(
            "LLM provider initialized (chat: {}, embeddings: {})",
            config.llm.chat_model,
            config.embedding.model
        );

        let index: Arc<dyn VectorIndexProvider> = Arc::new(PineconeIndex::new(
            &config.vector_index,
            config.embedding.dimensions,
        ));
        tracing::info!("Vector index client initialized ({})", index.name());

        let retriever = Arc::new(HybridRetriever::new(
            Arc::clone(&embedder),
            Arc::clone(&index),
        ));

        let orchestrator = AnsweringOrchestrator::new(
            retriever,
            Arc::clone(&llm),
            Arc::clone(&index),
            config.answering.clone(),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                fetcher,
                embedder,
                llm,
                index,
                orchestrator,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &DocQaConfig {
        &self.inner.config
    }

    /// Get the document fetcher
    pub fn fetcher(&self) -> &DocumentFetcher {
        &self.inner.fetcher
    }

    /// Get the embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get the LLM provider
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    /// Get the vector index provider
    pub fn index(&self) -> &Arc<dyn VectorIndexProvider> {
        &self.inner.index
    }

    /// Get the answering orchestrator
    pub fn orchestrator(&self) -> &AnsweringOrchestrator {
        &self.inner.orchestrator
    }

    /// Build the per-request index namespace for a document
    pub fn namespace_for(&self, document_id: &Uuid) -> String {
        format!(
            "{}-{}",
            self.inner.config.vector_index.namespace_prefix, document_id
        )
    }
}

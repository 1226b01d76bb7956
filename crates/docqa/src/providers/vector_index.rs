//! Vector index provider trait

use async_trait::async_trait;

use crate::error::Result;

/// A chunk record to be written to the index
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    /// Record ID ("chunk-{index}")
    pub id: String,
    /// Embedding vector
    pub values: Vec<f32>,
    /// Chunk text, stored as metadata alongside the vector
    pub text: String,
}

/// A scored chunk returned from a query
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// Record ID
    pub id: String,
    /// Chunk text from record metadata
    pub text: String,
    /// Similarity score (higher is better)
    pub score: f32,
}

/// Trait for the external vector index
///
/// All operations are scoped by a namespace; the pipeline uses one fresh
/// namespace per request and deletes it after answering.
#[async_trait]
pub trait VectorIndexProvider: Send + Sync {
    /// Upsert chunk records into a namespace
    async fn upsert(&self, namespace: &str, records: &[ChunkRecord]) -> Result<()>;

    /// Dense similarity search
    async fn query_dense(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>>;

    /// Keyword search via a metadata contains-filter
    ///
    /// Not every index deployment supports this; callers treat failure as
    /// soft and continue with dense results.
    async fn query_keyword(
        &self,
        namespace: &str,
        term: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>>;

    /// Delete every record in a namespace
    async fn delete_namespace(&self, namespace: &str) -> Result<()>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

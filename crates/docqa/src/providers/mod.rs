//! Provider abstractions for embeddings, LLM and the vector index
//!
//! The embedding API, chat API and vector index are external hosted
//! services; these traits are the narrow contracts the pipeline depends on.

pub mod embedding;
pub mod llm;
pub mod openai;
pub mod pinecone;
pub mod retry;
pub mod vector_index;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use vector_index::{ChunkRecord, ScoredChunk, VectorIndexProvider};

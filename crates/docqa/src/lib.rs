//! docqa: document question answering over retrieved context
//!
//! Given a document URL and a list of questions, the service downloads the
//! document, extracts text, splits it into overlapping chunks, indexes the
//! chunks in an external vector index under a per-request namespace,
//! retrieves relevant chunks per question (dense + keyword, merged and
//! deduplicated), and asks a hosted LLM to answer each question from the
//! retrieved context. Indexed state is deleted after the response.

pub mod analysis;
pub mod answering;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::DocQaConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, Document, FileType},
    query::RunRequest,
    response::RunResponse,
};

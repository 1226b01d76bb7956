//! Core types for documents, requests and responses

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, Document, FileType};
pub use query::RunRequest;
pub use response::RunResponse;

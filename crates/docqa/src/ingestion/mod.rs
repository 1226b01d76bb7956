//! Document ingestion: download, text extraction, chunking

pub mod chunker;
pub mod fetcher;
pub mod parser;

pub use chunker::TextChunker;
pub use fetcher::{DocumentFetcher, DownloadedFile};
pub use parser::{FileParser, ParsedText};

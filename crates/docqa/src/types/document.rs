//! Document and chunk types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported file types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// RFC 822 email (.eml)
    Eml,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// HTML document
    Html,
    /// Unknown file type
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "eml" => Self::Eml,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            "html" | "htm" => Self::Html,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a MIME type string
    pub fn from_mime(mime: &str) -> Self {
        // Parameters like "; charset=utf-8" are not part of the essence
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence {
            "application/pdf" => Self::Pdf,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Self::Docx
            }
            "message/rfc822" => Self::Eml,
            "text/plain" => Self::Txt,
            "text/markdown" => Self::Markdown,
            "text/html" => Self::Html,
            _ => Self::Unknown,
        }
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Eml => "Email (.eml)",
            Self::Txt => "Text File",
            Self::Markdown => "Markdown",
            Self::Html => "HTML",
            Self::Unknown => "Unknown",
        }
    }
}

/// A document fetched and indexed for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID (doubles as the index namespace suffix)
    pub id: Uuid,
    /// Source URL the document was fetched from
    pub source_url: String,
    /// Filename derived from the URL path
    pub filename: String,
    /// File type
    pub file_type: FileType,
    /// Content hash of the extracted text
    pub content_hash: String,
    /// Total number of pages (if applicable)
    pub total_pages: Option<u32>,
    /// Total number of chunks created
    pub total_chunks: u32,
    /// Raw file size in bytes
    pub file_size: u64,
    /// Fetch timestamp
    pub fetched_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a new document record
    pub fn new(
        source_url: String,
        filename: String,
        file_type: FileType,
        content_hash: String,
        file_size: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_url,
            filename,
            file_type,
            content_hash,
            total_pages: None,
            total_chunks: 0,
            file_size,
            fetched_at: chrono::Utc::now(),
        }
    }
}

/// A chunk of document text awaiting or holding an embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of this chunk within the document (0-based)
    pub index: u32,
    /// Chunk text
    pub text: String,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(index: u32, text: String) -> Self {
        Self { index, text }
    }

    /// Record ID used in the vector index ("chunk-{index}")
    pub fn record_id(&self) -> String {
        format!("chunk-{}", self.index)
    }
}

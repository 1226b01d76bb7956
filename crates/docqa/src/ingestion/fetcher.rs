//! Document download over HTTP

use reqwest::Client;
use std::time::Duration;

use crate::config::DownloadConfig;
use crate::error::{Error, Result};

/// A file fetched from a URL, held in memory
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// Source URL
    pub url: String,
    /// Filename derived from the URL path
    pub filename: String,
    /// Content-Type header, if the server sent one
    pub content_type: Option<String>,
    /// Raw file bytes
    pub data: Vec<u8>,
}

/// HTTP document fetcher with a size cap
pub struct DocumentFetcher {
    client: Client,
    max_size: usize,
}

impl DocumentFetcher {
    /// Create a new fetcher
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_size: config.max_size,
        })
    }

    /// Download a document
    pub async fn fetch(&self, url: &str) -> Result<DownloadedFile> {
        tracing::info!("Downloading document from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::download(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::download(url, format!("HTTP {}", status)));
        }

        // Reject oversized documents before buffering when the server
        // declares a length
        if let Some(len) = response.content_length() {
            if len as usize > self.max_size {
                return Err(Error::download(
                    url,
                    format!("document too large: {} bytes (limit {})", len, self.max_size),
                ));
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let data = response
            .bytes()
            .await
            .map_err(|e| Error::download(url, e.to_string()))?;

        if data.len() > self.max_size {
            return Err(Error::download(
                url,
                format!(
                    "document too large: {} bytes (limit {})",
                    data.len(),
                    self.max_size
                ),
            ));
        }

        tracing::info!("Downloaded {} bytes from {}", data.len(), url);

        Ok(DownloadedFile {
            url: url.to_string(),
            filename: filename_from_url(url),
            content_type,
            data: data.to_vec(),
        })
    }
}

/// Derive a filename from the last path segment of a URL
///
/// Query string and fragment are stripped; an empty path yields "document".
pub fn filename_from_url(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);

    let name = without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("");

    // Skip the scheme-authority remnant of URLs with no path
    if name.is_empty() || name.contains(':') {
        "document".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://example.com/docs/policy.pdf"),
            "policy.pdf"
        );
        assert_eq!(
            filename_from_url("https://example.com/docs/policy.pdf?sig=abc&t=1"),
            "policy.pdf"
        );
        assert_eq!(
            filename_from_url("https://example.com/file.docx#page=2"),
            "file.docx"
        );
    }

    #[test]
    fn test_filename_from_url_without_path() {
        assert_eq!(filename_from_url("https://example.com"), "document");
        assert_eq!(filename_from_url("https://example.com/"), "document");
    }
}

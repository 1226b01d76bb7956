//! Query request types

use serde::{Deserialize, Serialize};

/// Request body for the run endpoint: one document URL, many questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// URL of the document to answer questions about
    pub documents: String,
    /// Natural-language questions
    pub questions: Vec<String>,
}

impl RunRequest {
    /// Create a new request
    pub fn new(documents: impl Into<String>, questions: Vec<String>) -> Self {
        Self {
            documents: documents.into(),
            questions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_run_request() {
        let request: RunRequest = serde_json::from_str(
            r#"{"documents": "https://example.com/policy.pdf", "questions": ["What is covered?"]}"#,
        )
        .unwrap();
        assert_eq!(request.documents, "https://example.com/policy.pdf");
        assert_eq!(request.questions.len(), 1);
    }
}

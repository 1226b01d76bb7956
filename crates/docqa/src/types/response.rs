//! Response types

use serde::{Deserialize, Serialize};

/// Response body for the run endpoint: one answer per question, in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    /// Answers, index-aligned with the request questions
    pub answers: Vec<String>,
}

impl RunResponse {
    /// Create a new response
    pub fn new(answers: Vec<String>) -> Self {
        Self { answers }
    }
}

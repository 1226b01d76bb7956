//! Prompt templates for grounded question answering

use crate::providers::ScoredChunk;

/// Fixed answer used when the document does not contain the information
pub const NOT_FOUND_ANSWER: &str = "Not found in document.";

/// Prompt builder for retrieval-grounded queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// System prompt establishing grounded, concise answering
    pub fn system_prompt() -> &'static str {
        "You are a helpful assistant that provides accurate and factual answers \
         based on the provided document. If a question contains multiple parts, \
         answer each part separately. Keep your answers concise and to the point, \
         limiting them to one or two sentences per part. If the answer is not \
         present in the context, respond with 'Not found in document.'"
    }

    /// Build context by joining retrieved chunk texts
    pub fn build_context(chunks: &[ScoredChunk]) -> String {
        chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the concise grounded prompt for one question
    pub fn build_concise_prompt(question: &str, context: &str) -> String {
        format!(
            "Answer concisely and only with facts from the context. \
             If the answer is not present in the context, reply: 'Not found in document.'\n\
             Question: {}\nContext: {}",
            question, context
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_context_joins_chunk_texts() {
        let chunks = vec![
            ScoredChunk {
                id: "chunk-0".to_string(),
                text: "First clause.".to_string(),
                score: 0.9,
            },
            ScoredChunk {
                id: "chunk-1".to_string(),
                text: "Second clause.".to_string(),
                score: 0.8,
            },
        ];
        assert_eq!(
            PromptBuilder::build_context(&chunks),
            "First clause.\nSecond clause."
        );
    }

    #[test]
    fn test_concise_prompt_contains_question_and_context() {
        let prompt = PromptBuilder::build_concise_prompt("What is the grace period?", "ctx");
        assert!(prompt.contains("Question: What is the grace period?"));
        assert!(prompt.contains("Context: ctx"));
        assert!(prompt.contains("Not found in document."));
    }
}

//! Hybrid (dense + keyword) retrieval with merge and deduplication

use std::collections::HashSet;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::providers::{EmbeddingProvider, ScoredChunk, VectorIndexProvider};

/// Hybrid retriever over the external vector index
///
/// Dense similarity results take precedence; keyword matches fill the
/// remainder. Duplicates are collapsed by a prefix key so overlapping
/// chunks retrieved by both paths appear once.
pub struct HybridRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndexProvider>,
}

impl HybridRetriever {
    /// Create a new retriever
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndexProvider>) -> Self {
        Self { embedder, index }
    }

    /// Retrieve up to `max_chunks` relevant chunks for a question
    ///
    /// `top_k` bounds each underlying index query; `max_chunks` caps the
    /// merged result.
    pub async fn retrieve(
        &self,
        namespace: &str,
        question: &str,
        top_k: usize,
        max_chunks: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let query_embedding = self.embedder.embed(question).await?;

        let dense = self
            .index
            .query_dense(namespace, &query_embedding, top_k)
            .await?;

        // Keyword search is best-effort; not every index supports the
        // contains-filter
        let keyword = match self.index.query_keyword(namespace, question, top_k).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Keyword search failed or not supported: {}", e);
                Vec::new()
            }
        };

        let mut seen = HashSet::new();
        let mut merged = Vec::new();

        for chunk in dense.into_iter().chain(keyword) {
            if merged.len() >= max_chunks {
                break;
            }
            if chunk.text.trim().is_empty() {
                continue;
            }
            if seen.insert(dedup_key(&chunk.text)) {
                merged.push(chunk);
            }
        }

        tracing::debug!(
            "Retrieved {} merged chunks for question (top_k={}, cap={})",
            merged.len(),
            top_k,
            max_chunks
        );

        Ok(merged)
    }
}

/// Deduplication key: the first 50 graphemes of the chunk text
fn dedup_key(text: &str) -> String {
    text.graphemes(true).take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::error::Error;
    use crate::providers::ChunkRecord;

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.1, 0.2, 0.3])
        }

        fn dimensions(&self) -> usize {
            3
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FixedIndex {
        dense: Vec<ScoredChunk>,
        keyword: Result<Vec<ScoredChunk>>,
    }

    #[async_trait]
    impl VectorIndexProvider for FixedIndex {
        async fn upsert(&self, _namespace: &str, _records: &[ChunkRecord]) -> Result<()> {
            Ok(())
        }

        async fn query_dense(
            &self,
            _namespace: &str,
            _vector: &[f32],
            _top_k: usize,
        ) -> Result<Vec<ScoredChunk>> {
            Ok(self.dense.clone())
        }

        async fn query_keyword(
            &self,
            _namespace: &str,
            _term: &str,
            _top_k: usize,
        ) -> Result<Vec<ScoredChunk>> {
            match &self.keyword {
                Ok(matches) => Ok(matches.clone()),
                Err(_) => Err(Error::vector_index("filter not supported")),
            }
        }

        async fn delete_namespace(&self, _namespace: &str) -> Result<()> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn chunk(id: &str, text: &str, score: f32) -> ScoredChunk {
        ScoredChunk {
            id: id.to_string(),
            text: text.to_string(),
            score,
        }
    }

    fn retriever(index: FixedIndex) -> HybridRetriever {
        HybridRetriever::new(Arc::new(FixedEmbedder), Arc::new(index))
    }

    #[tokio::test]
    async fn test_dense_results_come_first() {
        let index = FixedIndex {
            dense: vec![chunk("chunk-0", "dense one", 0.9)],
            keyword: Ok(vec![chunk("chunk-5", "keyword one", 0.0)]),
        };
        let merged = retriever(index)
            .retrieve("req-x", "question", 8, 4)
            .await
            .unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "chunk-0");
        assert_eq!(merged[1].id, "chunk-5");
    }

    #[tokio::test]
    async fn test_duplicates_collapse_by_prefix_key() {
        let shared = "The grace period for premium payment is thirty days from the due date listed.";
        let index = FixedIndex {
            dense: vec![chunk("chunk-1", shared, 0.9)],
            keyword: Ok(vec![chunk("chunk-1", shared, 0.0), chunk("chunk-2", "Different text.", 0.0)]),
        };
        let merged = retriever(index)
            .retrieve("req-x", "question", 8, 4)
            .await
            .unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "chunk-1");
        assert_eq!(merged[1].id, "chunk-2");
    }

    #[tokio::test]
    async fn test_merged_results_respect_cap() {
        let dense: Vec<ScoredChunk> = (0..6)
            .map(|i| chunk(&format!("chunk-{}", i), &format!("Dense text number {}.", i), 0.9))
            .collect();
        let index = FixedIndex {
            dense,
            keyword: Ok(vec![chunk("chunk-9", "Keyword text.", 0.0)]),
        };
        let merged = retriever(index)
            .retrieve("req-x", "question", 8, 4)
            .await
            .unwrap();
        assert_eq!(merged.len(), 4);
        assert!(merged.iter().all(|c| c.id.starts_with("chunk-")));
    }

    #[tokio::test]
    async fn test_keyword_failure_is_soft() {
        let index = FixedIndex {
            dense: vec![chunk("chunk-0", "Only dense.", 0.9)],
            keyword: Err(Error::vector_index("unsupported")),
        };
        let merged = retriever(index)
            .retrieve("req-x", "question", 8, 4)
            .await
            .unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "Only dense.");
    }
}

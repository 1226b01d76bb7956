//! Per-question answering with widened-context retry and deferred cleanup

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::analysis::{best_matching_clause, extract_contact_details, is_contact_question,
    parse_query, clause::CLAUSE_NOT_FOUND};
use crate::config::AnsweringConfig;
use crate::generation::prompt::{PromptBuilder, NOT_FOUND_ANSWER};
use crate::providers::{LlmProvider, VectorIndexProvider};
use crate::retrieval::HybridRetriever;

/// Drives concurrent per-question retrieval and generation
pub struct AnsweringOrchestrator {
    retriever: Arc<HybridRetriever>,
    llm: Arc<dyn LlmProvider>,
    index: Arc<dyn VectorIndexProvider>,
    config: AnsweringConfig,
}

impl AnsweringOrchestrator {
    /// Create a new orchestrator
    pub fn new(
        retriever: Arc<HybridRetriever>,
        llm: Arc<dyn LlmProvider>,
        index: Arc<dyn VectorIndexProvider>,
        config: AnsweringConfig,
    ) -> Self {
        Self {
            retriever,
            llm,
            index,
            config,
        }
    }

    /// Answer every question concurrently, bounded by the configured limit
    ///
    /// Answers come back index-aligned with the questions. Individual
    /// failures degrade to fallback answers, never to a request error.
    pub async fn answer_all(
        &self,
        namespace: &str,
        document_text: &str,
        chunk_texts: &[String],
        questions: &[String],
    ) -> Vec<String> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_questions.max(1)));
        let total = questions.len();

        let question_futures: Vec<_> = questions
            .iter()
            .enumerate()
            .map(|(idx, question)| {
                let semaphore = Arc::clone(&semaphore);

                async move {
                    let _permit = semaphore.acquire().await.unwrap();

                    let start = Instant::now();
                    tracing::info!("Processing question {}/{}: {}", idx + 1, total, question);

                    let answer = self
                        .answer_one(namespace, document_text, chunk_texts, question)
                        .await;

                    tracing::info!(
                        "Question {}/{} answered in {:.2}s",
                        idx + 1,
                        total,
                        start.elapsed().as_secs_f64()
                    );

                    answer
                }
            })
            .collect();

        join_all(question_futures).await
    }

    /// Answer a single question
    async fn answer_one(
        &self,
        namespace: &str,
        document_text: &str,
        chunk_texts: &[String],
        question: &str,
    ) -> String {
        // Contact questions are answered directly from regex extraction
        // over the full document; retrieval adds nothing there
        if is_contact_question(question) {
            let details = extract_contact_details(document_text);
            if let Some(answer) = details.summarize() {
                tracing::info!("Answered contact question from extracted details");
                return answer;
            }
        }

        let first_pass = self
            .ask_with_context(
                namespace,
                question,
                self.config.first_pass_top_k,
                self.config.first_pass_chunks,
            )
            .await;

        let answer = match first_pass {
            Ok(answer) if !is_insufficient(&answer) => Some(answer),
            Ok(_) => {
                tracing::info!(
                    "LLM returned empty or generic answer, retrying with more context chunks"
                );
                self.retry_pass(namespace, question).await
            }
            Err(e) => {
                tracing::warn!("First answering pass failed: {}", e);
                self.retry_pass(namespace, question).await
            }
        };

        match answer {
            Some(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
            Some(_) => NOT_FOUND_ANSWER.to_string(),
            None => self.clause_fallback(chunk_texts, question),
        }
    }

    /// Widened-context retry: larger candidate pool, larger merged cap
    async fn retry_pass(&self, namespace: &str, question: &str) -> Option<String> {
        match self
            .ask_with_context(
                namespace,
                question,
                self.config.retry_top_k,
                self.config.retry_chunks,
            )
            .await
        {
            Ok(answer) => Some(answer),
            Err(e) => {
                tracing::error!("Error generating answer: {}", e);
                None
            }
        }
    }

    /// Retrieve context and ask the LLM once
    async fn ask_with_context(
        &self,
        namespace: &str,
        question: &str,
        top_k: usize,
        max_chunks: usize,
    ) -> crate::error::Result<String> {
        let chunks = self
            .retriever
            .retrieve(namespace, question, top_k, max_chunks)
            .await?;

        tracing::info!("Selected top {} relevant chunks for question", chunks.len());

        let context = PromptBuilder::build_context(&chunks);
        self.llm.generate_answer(question, &context).await
    }

    /// Last-resort lexical answer when the LLM is unreachable
    fn clause_fallback(&self, chunk_texts: &[String], question: &str) -> String {
        let parsed = parse_query(question);
        best_matching_clause(chunk_texts.iter().map(|s| s.as_str()), question, &parsed)
            .unwrap_or_else(|| CLAUSE_NOT_FOUND.to_string())
    }

    /// Schedule best-effort deletion of the request namespace
    ///
    /// Runs after the response is produced; failures are logged and the
    /// namespace is left for the index's own retention to reap.
    pub fn schedule_cleanup(&self, namespace: String) {
        let index = Arc::clone(&self.index);

        tokio::spawn(async move {
            match index.delete_namespace(&namespace).await {
                Ok(()) => tracing::info!("Cleaned up index namespace {}", namespace),
                Err(e) => {
                    tracing::warn!("Failed to clean up index namespace {}: {}", namespace, e)
                }
            }
        });
    }
}

/// Check whether an answer is empty or a generic refusal
fn is_insufficient(answer: &str) -> bool {
    let normalized = answer
        .trim()
        .trim_matches(['\'', '"'])
        .trim_end_matches(['.', '!'])
        .to_lowercase();

    matches!(
        normalized.as_str(),
        "" | "not found" | "not found in document" | "no answer"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::error::{Error, Result};
    use crate::providers::{ChunkRecord, EmbeddingProvider, ScoredChunk};

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.5; 4])
        }

        fn dimensions(&self) -> usize {
            4
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    /// Index serving a fixed pool of dense chunks, recording deletions
    struct PoolIndex {
        pool: Vec<ScoredChunk>,
        deleted: Mutex<Vec<String>>,
    }

    impl PoolIndex {
        fn with_chunks(count: usize) -> Self {
            let pool = (0..count)
                .map(|i| ScoredChunk {
                    id: format!("chunk-{}", i),
                    text: format!("Distinct policy clause number {} with detail.", i),
                    score: 1.0 - i as f32 * 0.01,
                })
                .collect();
            Self {
                pool,
                deleted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VectorIndexProvider for PoolIndex {
        async fn upsert(&self, _namespace: &str, _records: &[ChunkRecord]) -> Result<()> {
            Ok(())
        }

        async fn query_dense(
            &self,
            _namespace: &str,
            _vector: &[f32],
            top_k: usize,
        ) -> Result<Vec<ScoredChunk>> {
            Ok(self.pool.iter().take(top_k).cloned().collect())
        }

        async fn query_keyword(
            &self,
            _namespace: &str,
            _term: &str,
            _top_k: usize,
        ) -> Result<Vec<ScoredChunk>> {
            Ok(Vec::new())
        }

        async fn delete_namespace(&self, namespace: &str) -> Result<()> {
            self.deleted.lock().unwrap().push(namespace.to_string());
            Ok(())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "pool"
        }
    }

    /// LLM returning scripted responses, recording contexts it was given
    struct ScriptedLlm {
        responses: Mutex<Vec<Result<String>>>,
        contexts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                contexts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn echo() -> Self {
            Self::new(Vec::new())
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn generate_answer(&self, question: &str, context: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.contexts.lock().unwrap().push(context.to_string());

            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(format!("answer to: {}", question))
            } else {
                responses.remove(0)
            }
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }
    }

    fn orchestrator(
        index: Arc<PoolIndex>,
        llm: Arc<ScriptedLlm>,
        config: AnsweringConfig,
    ) -> AnsweringOrchestrator {
        let retriever = Arc::new(HybridRetriever::new(
            Arc::new(FixedEmbedder),
            Arc::clone(&index) as Arc<dyn VectorIndexProvider>,
        ));
        AnsweringOrchestrator::new(retriever, llm, index, config)
    }

    fn chunk_texts(index: &PoolIndex) -> Vec<String> {
        index.pool.iter().map(|c| c.text.clone()).collect()
    }

    #[tokio::test]
    async fn test_generic_answer_triggers_widened_retry() {
        let index = Arc::new(PoolIndex::with_chunks(20));
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("Not found in document.".to_string()),
            Ok("The grace period is thirty days.".to_string()),
        ]));
        let config = AnsweringConfig::default();
        let orch = orchestrator(Arc::clone(&index), Arc::clone(&llm), config.clone());

        let answers = orch
            .answer_all(
                "req-1",
                "doc text",
                &chunk_texts(&index),
                &["What is the grace period?".to_string()],
            )
            .await;

        assert_eq!(answers, vec!["The grace period is thirty days."]);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 2);

        // The retry saw a wider context than the first pass
        let contexts = llm.contexts.lock().unwrap();
        assert_eq!(contexts[0].lines().count(), config.first_pass_chunks);
        assert_eq!(contexts[1].lines().count(), config.retry_chunks);
    }

    #[tokio::test]
    async fn test_answers_preserve_question_order() {
        let index = Arc::new(PoolIndex::with_chunks(8));
        let llm = Arc::new(ScriptedLlm::echo());
        let mut config = AnsweringConfig::default();
        config.max_concurrent_questions = 2;
        let orch = orchestrator(Arc::clone(&index), llm, config);

        let questions: Vec<String> = (0..5).map(|i| format!("question {}?", i)).collect();
        let answers = orch
            .answer_all("req-2", "doc text", &chunk_texts(&index), &questions)
            .await;

        assert_eq!(answers.len(), 5);
        for (i, answer) in answers.iter().enumerate() {
            assert_eq!(answer, &format!("answer to: question {}?", i));
        }
    }

    #[tokio::test]
    async fn test_contact_question_skips_the_llm() {
        let index = Arc::new(PoolIndex::with_chunks(4));
        let llm = Arc::new(ScriptedLlm::echo());
        let orch = orchestrator(Arc::clone(&index), Arc::clone(&llm), AnsweringConfig::default());

        let answers = orch
            .answer_all(
                "req-3",
                "For help write to support@insurer.example.com today.",
                &chunk_texts(&index),
                &["How can I contact support?".to_string()],
            )
            .await;

        assert!(answers[0].contains("support@insurer.example.com"));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_to_clause_match() {
        let index = Arc::new(PoolIndex::with_chunks(2));
        let llm = Arc::new(ScriptedLlm::new(vec![
            Err(Error::llm("connection refused")),
            Err(Error::llm("connection refused")),
        ]));
        let orch = orchestrator(Arc::clone(&index), llm, AnsweringConfig::default());

        let chunks = vec![
            "Knee surgery is covered after twenty-four months.".to_string(),
            "Premiums are payable annually.".to_string(),
        ];
        let answers = orch
            .answer_all(
                "req-4",
                "doc text",
                &chunks,
                &["Is knee surgery covered?".to_string()],
            )
            .await;

        assert_eq!(answers, vec!["Knee surgery is covered after twenty-four months."]);
    }

    #[tokio::test]
    async fn test_blank_answer_becomes_not_found() {
        let index = Arc::new(PoolIndex::with_chunks(2));
        let llm = Arc::new(ScriptedLlm::new(vec![Ok("   ".to_string()), Ok("  ".to_string())]));
        let orch = orchestrator(Arc::clone(&index), llm, AnsweringConfig::default());

        let answers = orch
            .answer_all(
                "req-5",
                "doc text",
                &chunk_texts(&index),
                &["Anything?".to_string()],
            )
            .await;

        assert_eq!(answers, vec![NOT_FOUND_ANSWER]);
    }

    #[tokio::test]
    async fn test_cleanup_deletes_the_namespace() {
        let index = Arc::new(PoolIndex::with_chunks(1));
        let llm = Arc::new(ScriptedLlm::echo());
        let orch = orchestrator(Arc::clone(&index), llm, AnsweringConfig::default());

        orch.schedule_cleanup("req-6".to_string());

        // The delete runs on a spawned task; yield until it lands
        for _ in 0..50 {
            tokio::task::yield_now().await;
            if !index.deleted.lock().unwrap().is_empty() {
                break;
            }
        }
        assert_eq!(*index.deleted.lock().unwrap(), vec!["req-6".to_string()]);
    }

    #[test]
    fn test_is_insufficient_detection() {
        assert!(is_insufficient(""));
        assert!(is_insufficient("  Not found.  "));
        assert!(is_insufficient("Not found in document."));
        assert!(is_insufficient("'Not found in document.'"));
        assert!(is_insufficient("NO ANSWER"));
        assert!(!is_insufficient("The grace period is thirty days."));
    }
}

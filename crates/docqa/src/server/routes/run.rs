//! Query endpoint: download, chunk, index, answer, clean up

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::ingestion::{FileParser, TextChunker};
use crate::providers::ChunkRecord;
use crate::server::state::AppState;
use crate::types::{Document, RunRequest, RunResponse};

/// POST /api/v1/hackrx/run - Answer questions about a document URL
pub async fn run_query(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunResponse>> {
    let start = Instant::now();

    tracing::info!(
        "Answering {} questions about {}",
        request.questions.len(),
        request.documents
    );

    if request.questions.is_empty() {
        return Ok(Json(RunResponse::new(Vec::new())));
    }

    // Download and extract text
    let stage = Instant::now();
    let file = state.fetcher().fetch(&request.documents).await?;
    let parsed = FileParser::parse(&file)?;
    tracing::info!(
        "Extracted {} characters from {} ({}) in {:.2}s",
        parsed.content.len(),
        file.filename,
        parsed.file_type.display_name(),
        stage.elapsed().as_secs_f64()
    );

    let mut document = Document::new(
        file.url.clone(),
        file.filename.clone(),
        parsed.file_type.clone(),
        parsed.content_hash.clone(),
        file.data.len() as u64,
    );
    document.total_pages = parsed.total_pages;

    // Chunk the text with overlap
    let stage = Instant::now();
    let chunker = TextChunker::from_config(&state.config().chunking);
    let chunks = chunker.chunk_text(&parsed.content);
    if chunks.is_empty() {
        return Err(Error::extract(&file.filename, "document produced no chunks"));
    }
    document.total_chunks = chunks.len() as u32;
    tracing::info!(
        "Generated {} overlapping chunks in {:.2}s",
        chunks.len(),
        stage.elapsed().as_secs_f64()
    );
    tracing::debug!(
        "Prepared document {} ({} bytes, {} pages)",
        document.id,
        document.file_size,
        document.total_pages.unwrap_or(1)
    );

    // Embed and index the chunks under a fresh per-request namespace
    let stage = Instant::now();
    let namespace = state.namespace_for(&document.id);
    let batch_size = state.config().embedding.batch_size.max(1);

    let mut records = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(batch_size) {
        let batch_texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embeddings = state.embedder().embed_batch(&batch_texts).await?;
        for (chunk, values) in batch.iter().zip(embeddings) {
            records.push(ChunkRecord {
                id: chunk.record_id(),
                values,
                text: chunk.text.clone(),
            });
        }
    }
    state.index().upsert(&namespace, &records).await?;
    tracing::info!(
        "Indexed {} chunks into namespace {} in {:.2}s",
        records.len(),
        namespace,
        stage.elapsed().as_secs_f64()
    );

    // Answer all questions with bounded concurrency
    let chunk_texts: Vec<String> = chunks.into_iter().map(|c| c.text).collect();
    let answers = state
        .orchestrator()
        .answer_all(&namespace, &parsed.content, &chunk_texts, &request.questions)
        .await;

    // The namespace is ephemeral; reclaim it once the answers are ready
    state.orchestrator().schedule_cleanup(namespace);

    tracing::info!(
        "Returning {} answers to client in {:.2}s total",
        answers.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(Json(RunResponse::new(answers)))
}

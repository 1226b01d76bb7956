//! Overlapping text chunker with separator-aware splitting

use crate::config::ChunkingConfig;
use crate::types::Chunk;

/// Split separators in priority order: paragraphs, lines, sentence ends,
/// then words
const SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", "! ", "? ", " "];

/// Text chunker with configurable size and overlap
///
/// Splits on the highest-priority separator that keeps pieces within the
/// target size, then greedily merges pieces into windows, carrying an
/// overlap of trailing pieces into the next window.
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
    /// Minimum chunk length to keep
    min_size: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap: overlap.min(chunk_size.saturating_sub(1)),
            min_size: 1,
        }
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        let mut chunker = Self::new(config.chunk_size, config.chunk_overlap);
        chunker.min_size = config.min_chunk_size;
        chunker
    }

    /// Split text into overlapping chunks
    pub fn chunk_text(&self, text: &str) -> Vec<Chunk> {
        let pieces = self.split_pieces(text, &SEPARATORS);

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut window: Vec<String> = Vec::new();
        let mut window_len = 0usize;

        for piece in pieces {
            let piece_len = piece.len();

            if !window.is_empty() && window_len + piece_len > self.chunk_size {
                self.push_chunk(&mut chunks, &window);

                // Shrink the window to the overlap budget, and further if
                // the incoming piece would still not fit
                while window_len > self.overlap
                    || (!window.is_empty() && window_len + piece_len > self.chunk_size)
                {
                    let removed = window.remove(0);
                    window_len -= removed.len();
                }
            }

            window_len += piece.len();
            window.push(piece);
        }

        if !window.is_empty() {
            self.push_chunk(&mut chunks, &window);
        }

        chunks
    }

    /// Emit the current window as a chunk if it has real content
    fn push_chunk(&self, chunks: &mut Vec<Chunk>, window: &[String]) {
        let text = window.concat();
        let trimmed = text.trim();
        if trimmed.len() >= self.min_size && !trimmed.is_empty() {
            chunks.push(Chunk::new(chunks.len() as u32, trimmed.to_string()));
        }
    }

    /// Recursively split text into pieces no longer than `chunk_size`
    ///
    /// Each separator keeps its text attached to the left piece so the
    /// concatenation of all pieces reproduces the input.
    fn split_pieces(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if text.len() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let Some((separator, rest)) = separators.split_first() else {
            return self.hard_split(text);
        };

        if !text.contains(separator) {
            return self.split_pieces(text, rest);
        }

        let mut pieces = Vec::new();
        for part in text.split_inclusive(separator) {
            if part.len() > self.chunk_size {
                pieces.extend(self.split_pieces(part, rest));
            } else {
                pieces.push(part.to_string());
            }
        }
        pieces
    }

    /// Last resort for separator-free runs: split at character boundaries
    fn hard_split(&self, text: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut start = 0;

        while start < text.len() {
            let mut end = (start + self.chunk_size).min(text.len());
            while end < text.len() && !text.is_char_boundary(end) {
                end += 1;
            }
            pieces.push(text[start..end].to_string());
            start = end;
        }

        pieces
    }
}

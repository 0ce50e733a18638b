//! Chunker port (§4.4).

use crate::error::Result;
use crate::ports::text_extractor::ExtractedText;
use crate::value_objects::PageSpan;

/// One chunk before encoding: ordinal, text, token count and page span.
#[derive(Debug, Clone)]
pub struct ChunkDraft {
    pub ordinal: u32,
    pub text: String,
    pub token_count: u32,
    pub page_span: PageSpan,
}

/// Splits a segment's extracted text into target-sized, overlapping chunks.
///
/// Pure and synchronous: chunking is CPU-bound text manipulation with no I/O,
/// unlike the other pipeline ports.
pub trait Chunker: Send + Sync {
    /// Produce chunks from `extracted`, numbered densely from 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be split into at least one chunk
    /// (e.g. the configured tokenizer rejects the input).
    fn chunk(&self, extracted: &ExtractedText) -> Result<Vec<ChunkDraft>>;
}

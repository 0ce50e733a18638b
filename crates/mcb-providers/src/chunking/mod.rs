//! Text extraction and paragraph-preserving chunking (§4.4).

use async_trait::async_trait;
use mcb_domain::constants::{CHUNK_FORCE_SPLIT_MULTIPLE, DEFAULT_CHUNK_OVERLAP_TOKENS, DEFAULT_CHUNK_TARGET_TOKENS};
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{ChunkDraft, Chunker, ExtractedText, PageOffset, TextExtractor, Tokenizer};
use mcb_domain::value_objects::PageSpan;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

/// Extracts text page-by-page via `pdf-extract`, building the char-offset
/// table the chunker needs to recover per-chunk page spans.
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, document_bytes: &[u8], page_span: PageSpan) -> Result<ExtractedText> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(document_bytes)
            .map_err(|e| Error::input_invalid(format!("failed to parse PDF: {e}")))?;

        let mut text = String::new();
        let mut page_offsets = Vec::new();
        let mut needs_ocr = false;

        for page_num in page_span.start..=page_span.end {
            let Some(page_text) = pages.get(page_num as usize) else {
                continue;
            };
            let normalized = collapse_whitespace(page_text);
            if normalized.trim().is_empty() {
                needs_ocr = true;
            }
            page_offsets.push(PageOffset {
                char_index: text.len(),
                page_num,
            });
            text.push_str(&normalized);
            text.push_str("\n\n");
        }

        Ok(ExtractedText {
            text,
            page_offsets,
            needs_ocr,
        })
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split("\n\n")
        .map(|paragraph| paragraph.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Approximates token count at ~4 characters per token, the common
/// rule-of-thumb absent a vendor-specific tokenizer (§4.4 keeps this
/// vendor-neutral behind the [`Tokenizer`] port).
pub struct NaiveTokenizer;

impl Tokenizer for NaiveTokenizer {
    fn token_count(&self, text: &str) -> u32 {
        let chars = text.chars().count();
        ((chars as f64 / 4.0).ceil() as u32).max(u32::from(!text.is_empty()))
    }
}

/// Splits extracted text into target-sized, overlapping chunks without
/// breaking paragraphs, unless a paragraph alone exceeds the force-split
/// threshold (`2 * target`), in which case it is split at the nearest
/// sentence boundary.
pub struct ParagraphChunker {
    tokenizer: Arc<dyn Tokenizer>,
    target_tokens: u32,
    overlap_tokens: u32,
}

impl ParagraphChunker {
    #[must_use]
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            tokenizer,
            target_tokens: DEFAULT_CHUNK_TARGET_TOKENS,
            overlap_tokens: DEFAULT_CHUNK_OVERLAP_TOKENS,
        }
    }

    fn force_split_threshold(&self) -> u32 {
        self.target_tokens * CHUNK_FORCE_SPLIT_MULTIPLE
    }

    fn split_oversized_paragraph(&self, paragraph: &str) -> Vec<String> {
        let sentences: Vec<&str> = paragraph.unicode_sentences().collect();
        if sentences.len() <= 1 {
            return vec![paragraph.to_owned()];
        }
        let mut pieces = Vec::new();
        let mut current = String::new();
        let mut current_tokens = 0u32;
        for sentence in sentences {
            let sentence_tokens = self.tokenizer.token_count(sentence);
            if current_tokens > 0 && current_tokens + sentence_tokens > self.target_tokens {
                pieces.push(std::mem::take(&mut current));
                current_tokens = 0;
            }
            current.push_str(sentence);
            current_tokens += sentence_tokens;
        }
        if !current.is_empty() {
            pieces.push(current);
        }
        pieces
    }
}

impl Chunker for ParagraphChunker {
    fn chunk(&self, extracted: &ExtractedText) -> Result<Vec<ChunkDraft>> {
        let mut paragraphs: Vec<String> = Vec::new();
        for paragraph in extracted.text.split("\n\n") {
            if paragraph.trim().is_empty() {
                continue;
            }
            if self.tokenizer.token_count(paragraph) > self.force_split_threshold() {
                paragraphs.extend(self.split_oversized_paragraph(paragraph));
            } else {
                paragraphs.push(paragraph.to_owned());
            }
        }

        if paragraphs.is_empty() {
            return Ok(Vec::new());
        }

        let mut drafts = Vec::new();
        let mut ordinal = 0u32;
        let mut cursor = 0usize;
        let mut char_cursor = 0usize;

        while cursor < paragraphs.len() {
            let mut chunk_text = String::new();
            let mut token_count = 0u32;
            let start_char = char_cursor;
            let mut end = cursor;

            while end < paragraphs.len() {
                let candidate_tokens = self.tokenizer.token_count(&paragraphs[end]);
                if token_count > 0 && token_count + candidate_tokens > self.target_tokens {
                    break;
                }
                chunk_text.push_str(&paragraphs[end]);
                chunk_text.push_str("\n\n");
                token_count += candidate_tokens;
                end += 1;
            }

            if end == cursor {
                chunk_text.push_str(&paragraphs[cursor]);
                token_count = self.tokenizer.token_count(&paragraphs[cursor]);
                end = cursor + 1;
            }

            let chunk_chars = chunk_text.len();
            let page_start = extracted.page_for_offset(start_char);
            let page_end = extracted.page_for_offset(start_char + chunk_chars.saturating_sub(1));

            drafts.push(ChunkDraft {
                ordinal,
                text: chunk_text.trim().to_owned(),
                token_count,
                page_span: PageSpan::new(page_start.min(page_end), page_start.max(page_end)),
            });

            ordinal += 1;
            char_cursor += chunk_chars;

            if end >= paragraphs.len() {
                break;
            }

            let mut rewind = end;
            let mut overlap_tokens = 0u32;
            while rewind > cursor && overlap_tokens < self.overlap_tokens {
                rewind -= 1;
                overlap_tokens += self.tokenizer.token_count(&paragraphs[rewind]);
            }
            cursor = rewind.max(cursor + 1);
            char_cursor = paragraphs[..cursor].iter().map(|p| p.len() + 2).sum();
        }

        Ok(drafts)
    }
}

//! Text extractor port (§4.4).

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::PageSpan;

/// Maps a character offset in [`ExtractedText::text`] to the page it came from.
#[derive(Debug, Clone, Copy)]
pub struct PageOffset {
    pub char_index: usize,
    pub page_num: u32,
}

/// Text extracted from a page range, plus the offset table needed to
/// recover per-chunk page spans.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub page_offsets: Vec<PageOffset>,
    /// Set when any page in the span yielded empty text (§4.4); informational only.
    pub needs_ocr: bool,
}

impl ExtractedText {
    /// Page number containing `char_index`, falling back to the span's last page offset.
    #[must_use]
    pub fn page_for_offset(&self, char_index: usize) -> u32 {
        self.page_offsets
            .iter()
            .rev()
            .find(|o| o.char_index <= char_index)
            .map_or(self.page_offsets.first().map_or(0, |o| o.page_num), |o| o.page_num)
    }
}

/// Converts the pages in a segment's span to text plus a page-offset table.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract text for `page_span` from the raw document bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying PDF cannot be parsed.
    async fn extract(&self, document_bytes: &[u8], page_span: PageSpan) -> Result<ExtractedText>;
}

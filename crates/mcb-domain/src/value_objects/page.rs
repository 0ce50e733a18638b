//! Page-level value objects: features fed to the boundary detector, and page spans
//! carried on segments/chunks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An inclusive page range. Invariant: `start <= end` (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpan {
    /// First page, 0-based
    pub start: u32,
    /// Last page, 0-based, inclusive
    pub end: u32,
}

impl PageSpan {
    /// Construct a span, panicking in debug builds if `start > end`.
    ///
    /// Internal invariant of the pipeline (boundary detector and chunker only
    /// ever build spans from already-validated page ranges); never constructed
    /// from unchecked external input.
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "page span start must not exceed end");
        Self { start, end }
    }

    /// Number of pages covered, inclusive.
    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Union of two spans (the widest start..end covering both).
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// An optional Bates-numbered page range (§3, §4.1 S1 scenario).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatesRange {
    /// First Bates number in the range, e.g. "DEF000001"
    pub start: String,
    /// Last Bates number in the range, e.g. "DEF000012"
    pub end: String,
}

/// Per-page features supplied by the PDF text/layout feature provider (§4.2, §6.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFeatures {
    /// 0-based page number
    pub page_num: u32,
    /// Extracted raw text of the page
    pub text: String,
    /// Dominant font family name on the page
    pub dominant_font: String,
    /// Distinct font sizes observed on the page
    pub font_sizes: Vec<f32>,
    /// Whether a running header was detected
    pub has_header: bool,
    /// Whether a running footer was detected
    pub has_footer: bool,
    /// Whether a printed page number was detected
    pub has_page_number: bool,
    /// Fraction of the page area covered by text, 0..1
    pub text_density: f32,
    /// Whether a signature block was detected
    pub has_signature_block: bool,
    /// Bates number stamped on the page, if any
    pub bates_number: Option<String>,
    /// Hash summarizing the page's structural layout (for discontinuity detection)
    pub structural_hash: u64,
    /// Raw layout blocks, opaque beyond boundary detection
    pub layout_dict_blocks: HashMap<String, serde_json::Value>,
}

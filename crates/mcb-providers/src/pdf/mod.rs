//! PDF feature extraction provider (§4.2 inputs, §6.3).
//!
//! `pdf-extract` gives page-level plain text only, no font/layout metadata,
//! so the richer [`PageFeatures`] fields the boundary detector wants
//! (dominant font, font sizes, structural hash) are derived heuristically
//! from that text rather than read off the PDF's content stream. This keeps
//! the port's pure-function, synchronous contract intact without pulling in
//! a full PDF layout engine.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use mcb_domain::error::{Error, Result};
use mcb_domain::ports::PdfFeatureProvider;
use mcb_domain::value_objects::PageFeatures;
use regex::Regex;
use std::sync::LazyLock;

static BATES_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]{2,8}[-_]?\d{4,10})\b").expect("static pattern is valid")
});
static PAGE_NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*\d{1,4}\s*$").expect("static pattern is valid"));
static SIGNATURE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(/s/|signature:|signed:|sworn and subscribed)").expect("static pattern is valid")
});

/// Derives [`PageFeatures`] from `pdf-extract`'s per-page text output.
pub struct PdfExtractFeatureProvider;

impl PdfFeatureProvider for PdfExtractFeatureProvider {
    fn pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageFeatures>> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| Error::input_invalid(format!("failed to parse PDF: {e}")))?;
        Ok(pages
            .iter()
            .enumerate()
            .map(|(idx, text)| derive_features(idx as u32, text))
            .collect())
    }
}

fn derive_features(page_num: u32, text: &str) -> PageFeatures {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let first_line = lines.first().copied().unwrap_or_default();
    let last_line = lines.last().copied().unwrap_or_default();

    let has_header = !first_line.is_empty() && first_line.len() < 70 && first_line.chars().any(char::is_alphabetic);
    let has_page_number = PAGE_NUMBER_PATTERN.is_match(last_line);
    let has_footer = has_page_number || (last_line.len() < 50 && !last_line.is_empty());
    let has_signature_block = SIGNATURE_PATTERN.is_match(text);
    let bates_number = BATES_PATTERN.find(last_line).map(|m| m.as_str().to_owned());

    let text_density = (text.len() as f32 / 3000.0).min(1.0);

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    lines.len().hash(&mut hasher);
    for line in lines.iter().take(3) {
        line.len().hash(&mut hasher);
    }
    let structural_hash = hasher.finish();

    PageFeatures {
        page_num,
        text: text.to_owned(),
        dominant_font: "unknown".to_owned(),
        font_sizes: Vec::new(),
        has_header,
        has_footer,
        has_page_number,
        text_density,
        has_signature_block,
        bates_number,
        structural_hash,
        layout_dict_blocks: HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_alphabetic_first_line_is_treated_as_a_header() {
        let features = derive_features(0, "DEPOSITION OF JANE DOE\n\nbody text here.\n\nDEF000001");
        assert!(features.has_header);
        assert_eq!(features.bates_number.as_deref(), Some("DEF000001"));
    }

    #[test]
    fn signature_marker_is_detected() {
        let features = derive_features(0, "some text\n/s/ John Smith\n");
        assert!(features.has_signature_block);
    }

    #[test]
    fn bare_trailing_number_is_a_page_number() {
        let features = derive_features(0, "body text\n\n14");
        assert!(features.has_page_number);
    }
}

//! Rule-based + feature-delta boundary detector (§4.2).

use async_trait::async_trait;
use mcb_domain::entities::{DocumentType, Segment};
use mcb_domain::error::Result;
use mcb_domain::ports::BoundaryDetector;
use mcb_domain::value_objects::{DocumentId, PageFeatures, PageSpan, SegmentId};
use regex::Regex;
use std::sync::LazyLock;

const HARD_BOUNDARY_MIN_CONFIDENCE: f32 = 0.8;
const GAP_FILL_DEFAULT_CONFIDENCE: f32 = 0.3;

struct HeaderTrigger {
    pattern: Regex,
    document_type: DocumentType,
    indicator: &'static str,
}

static HEADER_TRIGGERS: LazyLock<Vec<HeaderTrigger>> = LazyLock::new(|| {
    let rule = |pattern: &str, document_type: DocumentType, indicator: &'static str| HeaderTrigger {
        pattern: Regex::new(pattern).expect("static pattern is valid"),
        document_type,
        indicator,
    };
    vec![
        rule(r"(?i)^\s*DEPOSITION OF", DocumentType::Deposition, "header:deposition-of"),
        rule(r"(?i)^\s*BILL OF LADING", DocumentType::BillOfLading, "header:bill-of-lading"),
        rule(r"(?i)^\s*EXPERT REPORT", DocumentType::ExpertReport, "header:expert-report"),
        rule(r"(?i)^\s*EXHIBIT\s+\S+", DocumentType::Exhibit, "header:exhibit"),
        rule(r"(?i)^\s*MOTION TO", DocumentType::Motion, "header:motion"),
        rule(r"(?i)^\s*INVOICE\s*#?\s*\d+", DocumentType::Invoice, "header:invoice"),
        rule(r"(?i)^\s*AFFIDAVIT OF", DocumentType::Affidavit, "header:affidavit"),
        rule(r"(?i)^\s*POLICE REPORT", DocumentType::PoliceReport, "header:police-report"),
        rule(r"(?i)^\s*INCIDENT REPORT", DocumentType::IncidentReport, "header:incident-report"),
        rule(
            r"(?im)^\s*(From:.*\n\s*To:.*\n\s*Subject:|To:\s.*\n\s*From:.*\n\s*Subject:)",
            DocumentType::Email,
            "header:email-block",
        ),
    ]
});

#[derive(Debug, Clone)]
struct Candidate {
    start: u32,
    end: u32,
    document_type: DocumentType,
    confidence: f32,
    indicators: Vec<String>,
}

/// Detects hard (header/Bates/structural) and soft (feature-delta) boundaries, then reconciles them.
pub struct RuleBasedBoundaryDetector {
    soft_threshold: f32,
    ocr_relaxation: f32,
}

impl RuleBasedBoundaryDetector {
    #[must_use]
    pub fn new(soft_threshold: f32, ocr_relaxation: f32) -> Self {
        Self {
            soft_threshold,
            ocr_relaxation,
        }
    }

    fn hard_candidates(pages: &[PageFeatures]) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for page in pages {
            for trigger in HEADER_TRIGGERS.iter() {
                if trigger.pattern.is_match(&page.text) {
                    candidates.push(Candidate {
                        start: page.page_num,
                        end: page.page_num,
                        document_type: trigger.document_type,
                        confidence: HARD_BOUNDARY_MIN_CONFIDENCE,
                        indicators: vec![trigger.indicator.to_owned()],
                    });
                }
            }
        }
        for window in pages.windows(2) {
            let (prev, curr) = (&window[0], &window[1]);
            if let (Some(prev_bates), Some(curr_bates)) = (&prev.bates_number, &curr.bates_number) {
                if bates_discontinuous(prev_bates, curr_bates) {
                    candidates.push(Candidate {
                        start: curr.page_num,
                        end: curr.page_num,
                        document_type: DocumentType::Unknown,
                        confidence: HARD_BOUNDARY_MIN_CONFIDENCE,
                        indicators: vec!["bates-discontinuity".to_owned()],
                    });
                }
            }
            if prev.structural_hash != curr.structural_hash && prev.dominant_font != curr.dominant_font {
                candidates.push(Candidate {
                    start: curr.page_num,
                    end: curr.page_num,
                    document_type: DocumentType::Unknown,
                    confidence: HARD_BOUNDARY_MIN_CONFIDENCE,
                    indicators: vec!["letterhead-transition".to_owned()],
                });
            }
        }
        candidates
    }

    fn soft_candidates(&self, pages: &[PageFeatures], needs_ocr: bool) -> Vec<Candidate> {
        let threshold = if needs_ocr {
            self.soft_threshold * self.ocr_relaxation
        } else {
            self.soft_threshold
        };
        let mut candidates = Vec::new();
        for window in pages.windows(2) {
            let (prev, curr) = (&window[0], &window[1]);
            let score = change_score(prev, curr);
            if score > threshold {
                candidates.push(Candidate {
                    start: curr.page_num,
                    end: curr.page_num,
                    document_type: DocumentType::Unknown,
                    confidence: score.min(1.0),
                    indicators: vec!["feature-delta".to_owned()],
                });
            }
        }
        candidates
    }
}

fn bates_discontinuous(prev: &str, curr: &str) -> bool {
    let (prev_prefix, prev_num) = split_bates(prev);
    let (curr_prefix, curr_num) = split_bates(curr);
    if prev_prefix != curr_prefix {
        return true;
    }
    match (prev_num, curr_num) {
        (Some(p), Some(c)) => c.saturating_sub(p) > 1,
        _ => false,
    }
}

fn split_bates(value: &str) -> (String, Option<u64>) {
    let digits_start = value.find(|c: char| c.is_ascii_digit()).unwrap_or(value.len());
    let prefix = value[..digits_start].to_owned();
    let number = value[digits_start..].parse::<u64>().ok();
    (prefix, number)
}

fn change_score(prev: &PageFeatures, curr: &PageFeatures) -> f32 {
    let density_delta = (prev.text_density - curr.text_density).abs();
    let font_delta = if prev.dominant_font == curr.dominant_font { 0.0 } else { 1.0 };
    let structural_delta = if prev.structural_hash == curr.structural_hash { 0.0 } else { 1.0 };
    let header_delta = if prev.has_header == curr.has_header { 0.0 } else { 0.5 };
    let footer_delta = if prev.has_footer == curr.has_footer { 0.0 } else { 0.5 };
    (density_delta + font_delta + structural_delta + header_delta + footer_delta) / 4.0
}

/// Each surviving candidate marks the START of a new segment rather than a
/// self-contained span: a header hit on page 5 means "a new document begins
/// here", and that segment runs until the next cut point, not just the one
/// page that matched. Candidates starting on the same page are merged into a
/// single cut, keeping the highest-confidence type.
fn reconcile(mut candidates: Vec<Candidate>, page_count: u32) -> Vec<Candidate> {
    if page_count == 0 {
        return Vec::new();
    }
    candidates.sort_by_key(|c| c.start);

    let mut cuts: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if let Some(last) = cuts.last_mut() {
            if last.start == candidate.start {
                if candidate.confidence > last.confidence {
                    last.document_type = candidate.document_type;
                    last.confidence = candidate.confidence;
                }
                last.indicators.extend(candidate.indicators);
                continue;
            }
        }
        cuts.push(candidate);
    }

    if cuts.first().is_none_or(|c| c.start != 0) {
        cuts.insert(
            0,
            Candidate {
                start: 0,
                end: 0,
                document_type: DocumentType::Unknown,
                confidence: GAP_FILL_DEFAULT_CONFIDENCE,
                indicators: vec!["gap-fill".to_owned()],
            },
        );
    }

    let mut result = Vec::with_capacity(cuts.len());
    for (index, cut) in cuts.iter().enumerate() {
        let end = cuts.get(index + 1).map_or(page_count - 1, |next| next.start - 1);
        result.push(Candidate {
            start: cut.start,
            end,
            document_type: cut.document_type,
            confidence: cut.confidence,
            indicators: cut.indicators.clone(),
        });
    }
    result
}

#[async_trait]
impl BoundaryDetector for RuleBasedBoundaryDetector {
    async fn detect(&self, case_name: &str, document_id: DocumentId, pages: &[PageFeatures]) -> Result<Vec<Segment>> {
        if pages.is_empty() {
            return Ok(Vec::new());
        }
        let needs_ocr = pages.iter().any(|p| p.text.trim().is_empty());
        let mut candidates = Self::hard_candidates(pages);
        candidates.extend(self.soft_candidates(pages, needs_ocr));
        let page_count = pages.len() as u32;
        let reconciled = reconcile(candidates, page_count);

        Ok(reconciled
            .into_iter()
            .map(|c| Segment {
                id: SegmentId::new(),
                document_id,
                case_name: case_name.to_owned(),
                page_span: PageSpan::new(c.start, c.end),
                document_type: c.document_type,
                title: None,
                confidence: c.confidence,
                bates_range: None,
                boundary_indicators: if c.indicators.is_empty() {
                    vec!["gap-fill".to_owned()]
                } else {
                    c.indicators
                },
                needs_ocr,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page_num: u32, text: &str) -> PageFeatures {
        PageFeatures {
            page_num,
            text: text.to_owned(),
            dominant_font: "Times".to_owned(),
            font_sizes: vec![12.0],
            has_header: false,
            has_footer: false,
            has_page_number: false,
            text_density: 0.5,
            has_signature_block: false,
            bates_number: None,
            structural_hash: 1,
            layout_dict_blocks: std::collections::HashMap::new(),
        }
    }

    #[tokio::test]
    async fn empty_pdf_yields_no_segments() {
        let detector = RuleBasedBoundaryDetector::new(0.55, 0.75);
        let segments = detector.detect("case1", DocumentId::new(), &[]).await.expect("ok");
        assert!(segments.is_empty());
    }

    #[tokio::test]
    async fn single_page_with_no_hard_rule_match_is_unknown() {
        let detector = RuleBasedBoundaryDetector::new(0.55, 0.75);
        let pages = vec![page(0, "just some body text with nothing special")];
        let segments = detector.detect("case1", DocumentId::new(), &pages).await.expect("ok");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].page_span, PageSpan::new(0, 0));
        assert_eq!(segments[0].document_type, DocumentType::Unknown);
    }

    #[tokio::test]
    async fn deposition_header_starts_a_new_high_confidence_segment() {
        let detector = RuleBasedBoundaryDetector::new(0.55, 0.75);
        let pages = vec![page(0, "DEPOSITION OF JANE DOE\nsome testimony"), page(1, "more testimony")];
        let segments = detector.detect("case1", DocumentId::new(), &pages).await.expect("ok");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].page_span, PageSpan::new(0, 1));
        assert_eq!(segments[0].document_type, DocumentType::Deposition);
        assert!(segments[0].confidence >= HARD_BOUNDARY_MIN_CONFIDENCE);
    }

    #[tokio::test]
    async fn segments_form_a_contiguous_partition() {
        let detector = RuleBasedBoundaryDetector::new(0.55, 0.75);
        let pages = vec![
            page(0, "MOTION TO COMPEL\nbody"),
            page(1, "body continues"),
            page(2, "INVOICE # 12345\nbody"),
        ];
        let segments = detector.detect("case1", DocumentId::new(), &pages).await.expect("ok");
        let mut cursor = 0u32;
        for segment in &segments {
            assert_eq!(segment.page_span.start, cursor);
            cursor = segment.page_span.end + 1;
        }
        assert_eq!(cursor, pages.len() as u32);
    }
}

//! Fact-extraction use case (§4.8).
//!
//! Thin wrapper around the `FactExtractor` port: applies the `documentType`
//! gate described in §4.8 before delegating, so the orchestrator and the
//! server's edit/delete endpoints share one place that knows the gate rule.
//! The extraction/dedup algorithm itself is the provider's responsibility
//! (the port documents this directly).

use std::sync::Arc;

use mcb_domain::entities::{Chunk, Fact, Segment};
use mcb_domain::error::Result;
use mcb_domain::ports::FactExtractor;
use mcb_domain::value_objects::CaseName;

/// Gates and delegates fact extraction and the external fact edit/delete API (§4.8).
#[derive(Clone)]
pub struct FactExtractionService {
    fact_extractor: Arc<dyn FactExtractor>,
}

impl FactExtractionService {
    /// Wrap a concrete `FactExtractor` provider.
    #[must_use]
    pub fn new(fact_extractor: Arc<dyn FactExtractor>) -> Self {
        Self { fact_extractor }
    }

    /// Extract facts from `segment`'s `chunks`, honoring the `documentType`
    /// gate unless `force` is set (§4.8: "Callers may override with a force flag").
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying extractor fails.
    pub async fn extract(&self, case: &CaseName, segment: &Segment, chunks: &[Chunk], force: bool) -> Result<Vec<Fact>> {
        if !force && !segment.document_type.fact_extraction_allowed() {
            return Ok(Vec::new());
        }
        self.fact_extractor.extract(case, segment, chunks).await
    }

    /// Edit an existing fact's content (§4.8 external API).
    ///
    /// # Errors
    ///
    /// Returns [`mcb_domain::error::Error::NotFound`] if `fact_id` is unknown.
    pub async fn edit_fact(&self, case: &CaseName, fact_id: &str, new_content: String, user_id: String, reason: String) -> Result<Fact> {
        self.fact_extractor.edit_fact(case, fact_id, new_content, user_id, reason).await
    }

    /// Soft-delete a fact (§4.8 external API).
    ///
    /// # Errors
    ///
    /// Returns [`mcb_domain::error::Error::NotFound`] if `fact_id` is unknown.
    pub async fn delete_fact(&self, case: &CaseName, fact_id: &str, user_id: String, reason: String) -> Result<()> {
        self.fact_extractor.delete_fact(case, fact_id, user_id, reason).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mcb_domain::entities::DocumentType;
    use mcb_domain::value_objects::{DocumentId, PageSpan, SegmentId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingExtractor(AtomicUsize);

    #[async_trait]
    impl FactExtractor for CountingExtractor {
        async fn extract(&self, _case: &CaseName, _segment: &Segment, _chunks: &[Chunk]) -> Result<Vec<Fact>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn edit_fact(&self, _case: &CaseName, _fact_id: &str, _new_content: String, _user_id: String, _reason: String) -> Result<Fact> {
            unimplemented!("not used in this test")
        }

        async fn delete_fact(&self, _case: &CaseName, _fact_id: &str, _user_id: String, _reason: String) -> Result<()> {
            Ok(())
        }
    }

    fn sample_segment(doc_type: DocumentType) -> Segment {
        Segment {
            id: SegmentId::new(),
            document_id: DocumentId::new(),
            case_name: "case1".to_owned(),
            page_span: PageSpan::new(0, 0),
            document_type: doc_type,
            title: None,
            confidence: 0.9,
            bates_range: None,
            boundary_indicators: vec!["test".to_owned()],
            needs_ocr: false,
        }
    }

    #[tokio::test]
    async fn gate_blocks_disallowed_type_without_force() {
        let extractor = Arc::new(CountingExtractor(AtomicUsize::new(0)));
        let service = FactExtractionService::new(extractor.clone());
        let case = CaseName::parse("case1").expect("valid");
        let segment = sample_segment(DocumentType::Motion);
        let facts = service.extract(&case, &segment, &[], false).await.expect("ok");
        assert!(facts.is_empty());
        assert_eq!(extractor.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn force_flag_bypasses_gate() {
        let extractor = Arc::new(CountingExtractor(AtomicUsize::new(0)));
        let service = FactExtractionService::new(extractor.clone());
        let case = CaseName::parse("case1").expect("valid");
        let segment = sample_segment(DocumentType::Motion);
        let _ = service.extract(&case, &segment, &[], true).await.expect("ok");
        assert_eq!(extractor.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn allowed_type_runs_without_force() {
        let extractor = Arc::new(CountingExtractor(AtomicUsize::new(0)));
        let service = FactExtractionService::new(extractor.clone());
        let case = CaseName::parse("case1").expect("valid");
        let segment = sample_segment(DocumentType::Email);
        let _ = service.extract(&case, &segment, &[], false).await.expect("ok");
        assert_eq!(extractor.0.load(Ordering::SeqCst), 1);
    }
}

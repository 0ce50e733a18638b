//! Fact extractor: LLM extraction, schema validation, cross-document dedup (§4.8).

use async_trait::async_trait;
use mcb_domain::constants::{FACT_DEDUP_COSINE_THRESHOLD, FACT_DEDUP_TEXT_EQUALITY_THRESHOLD};
use mcb_domain::entities::{Chunk, DateRef, Fact, FactCategory, ReviewStatus, Segment};
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{DenseEncoder, FactExtractor, LlmClient, VectorStoreAdapter};
use mcb_domain::value_objects::{CaseName, FactId};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Candidates considered for merge per new fact, by dense-vector proximity (§4.8).
const DEDUP_CANDIDATE_POOL: usize = 5;

const FACT_SCHEMA_HINT: &str = "{content, category, entities, dateReferences, confidence, sourceSnippet, page, bbox}";

#[derive(Debug, Deserialize)]
struct RawFact {
    content: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    entities: HashMap<String, Vec<String>>,
    #[serde(default)]
    date_references: Vec<RawDateRef>,
    confidence: f32,
    #[serde(default)]
    source_snippet: String,
    page: u32,
    #[serde(default)]
    bbox: Option<[f32; 4]>,
}

#[derive(Debug, Deserialize)]
struct RawDateRef {
    #[serde(default)]
    raw_text: String,
}

fn parse_category(raw: Option<&str>) -> FactCategory {
    match raw {
        Some("Injury") => FactCategory::Injury,
        Some("Treatment") => FactCategory::Treatment,
        Some("Liability") => FactCategory::Liability,
        Some("Damages") => FactCategory::Damages,
        Some("Timeline") => FactCategory::Timeline,
        Some("Witness") => FactCategory::Witness,
        Some("Communication") => FactCategory::Communication,
        Some("Financial") => FactCategory::Financial,
        Some("Compliance") => FactCategory::Compliance,
        _ => FactCategory::Other,
    }
}

fn word_overlap(a: &str, b: &str) -> f32 {
    let set_a: HashSet<&str> = a.split_whitespace().collect();
    let set_b: HashSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    let intersection = set_a.intersection(&set_b).count() as f32;
    let union = set_a.union(&set_b).count() as f32;
    if union == 0.0 {
        0.0
    } else {
        intersection / union
    }
}

/// LLM-backed fact extractor with embedding-based cross-document dedup within a case.
///
/// A candidate merges into an existing fact only when both the cosine score
/// [`mcb_domain::ports::VectorStoreAdapter::search_facts`] returns clears
/// [`FACT_DEDUP_COSINE_THRESHOLD`] and the two facts' text clears
/// [`FACT_DEDUP_TEXT_EQUALITY_THRESHOLD`] (§4.8) — the top-K pool alone is not
/// a substitute for the cosine floor, since a case with fewer than
/// `DEDUP_CANDIDATE_POOL` facts lets every candidate into the pool regardless
/// of how dissimilar it is.
pub struct HttpFactExtractor {
    llm: Arc<dyn LlmClient>,
    dense_encoder: Arc<dyn DenseEncoder>,
    vector_store: Arc<dyn VectorStoreAdapter>,
}

impl HttpFactExtractor {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>, dense_encoder: Arc<dyn DenseEncoder>, vector_store: Arc<dyn VectorStoreAdapter>) -> Self {
        Self {
            llm,
            dense_encoder,
            vector_store,
        }
    }

    async fn find_by_id(&self, case: &CaseName, fact_id: &str) -> Result<Fact> {
        let facts = self.vector_store.list_facts(case).await?;
        facts
            .into_iter()
            .find(|f| f.id.to_string() == fact_id)
            .ok_or_else(|| Error::not_found(format!("fact {fact_id}")))
    }
}

#[async_trait]
impl FactExtractor for HttpFactExtractor {
    async fn extract(&self, case: &CaseName, segment: &Segment, chunks: &[Chunk]) -> Result<Vec<Fact>> {
        let mut produced = Vec::new();

        for chunk in chunks {
            let raw_values = self.llm.extract_facts(&chunk.text, FACT_SCHEMA_HINT).await?;

            for raw_value in raw_values {
                let Ok(raw) = serde_json::from_value::<RawFact>(raw_value) else {
                    continue;
                };
                if raw.content.trim().is_empty() {
                    continue;
                }

                let dense = self.dense_encoder.embed(&raw.content).await?;
                let candidates = self.vector_store.search_facts(case, &dense, DEDUP_CANDIDATE_POOL).await?;
                let merge_target = candidates.into_iter().find(|(existing, cosine_score)| {
                    *cosine_score >= FACT_DEDUP_COSINE_THRESHOLD
                        && word_overlap(&existing.content, &raw.content) >= FACT_DEDUP_TEXT_EQUALITY_THRESHOLD
                });

                let fact = if let Some((mut existing, _)) = merge_target {
                    existing.chunk_ids.insert(chunk.id);
                    self.vector_store.upsert_fact(case, &existing).await?;
                    existing
                } else {
                    let mut chunk_ids = HashSet::new();
                    chunk_ids.insert(chunk.id);
                    let fact = Fact {
                        id: FactId::new(),
                        case_name: case.as_str().to_owned(),
                        document_id: segment.document_id,
                        chunk_ids,
                        content: raw.content,
                        category: parse_category(raw.category.as_deref()),
                        entities: raw.entities,
                        date_references: raw
                            .date_references
                            .into_iter()
                            .map(|d| DateRef {
                                date: None,
                                raw_text: d.raw_text,
                            })
                            .collect(),
                        confidence: raw.confidence,
                        source_snippet: raw.source_snippet,
                        page: raw.page,
                        bbox: raw.bbox,
                        is_edited: false,
                        is_deleted: false,
                        edit_history: Vec::new(),
                        review_status: ReviewStatus::Unreviewed,
                    };
                    self.vector_store.upsert_fact(case, &fact).await?;
                    fact
                };

                produced.push(fact);
            }
        }

        Ok(produced)
    }

    async fn edit_fact(&self, case: &CaseName, fact_id: &str, new_content: String, user_id: String, reason: String) -> Result<Fact> {
        let mut fact = self.find_by_id(case, fact_id).await?;
        fact.apply_edit(new_content, user_id, reason);
        self.vector_store.upsert_fact(case, &fact).await?;
        Ok(fact)
    }

    async fn delete_fact(&self, case: &CaseName, fact_id: &str, user_id: String, reason: String) -> Result<()> {
        let mut fact = self.find_by_id(case, fact_id).await?;
        fact.apply_delete(user_id, reason);
        self.vector_store.upsert_fact(case, &fact).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_overlap_is_one_for_identical_text() {
        assert!((word_overlap("same text here", "same text here") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn word_overlap_is_zero_for_disjoint_text() {
        assert_eq!(word_overlap("alpha beta", "gamma delta"), 0.0);
    }

    #[test]
    fn unknown_category_label_falls_back_to_other() {
        assert_eq!(parse_category(Some("NotARealCategory")), FactCategory::Other);
    }

    #[test]
    fn known_category_label_parses() {
        assert_eq!(parse_category(Some("Injury")), FactCategory::Injury);
    }

    use mcb_domain::entities::{ChunkMetadata, DocumentType};
    use mcb_domain::ports::LlmClassification;
    use mcb_domain::value_objects::{CaseName, ChunkId, DenseVector, DocumentId, PageSpan, SegmentId, SparseVector};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct StubLlm {
        raw_facts: Vec<Value>,
    }

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn classify(&self, _text: &str, _allowed_labels: &[String], _hints: &[String]) -> Result<LlmClassification> {
            Ok(LlmClassification {
                label: "Correspondence".to_owned(),
                confidence: 0.6,
            })
        }

        async fn extract_facts(&self, _text: &str, _schema_hint: &str) -> Result<Vec<Value>> {
            Ok(self.raw_facts.clone())
        }
    }

    struct StubDenseEncoder;

    #[async_trait]
    impl DenseEncoder for StubDenseEncoder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<DenseVector>> {
            Ok(texts.iter().map(|_| DenseVector(vec![1.0, 0.0])).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Returns one fixed candidate with a caller-controlled cosine score, regardless
    /// of the query vector, so the dedup gate can be exercised deterministically.
    struct OneCandidateStore {
        candidate: Fact,
        cosine_score: f32,
        upserted: Mutex<Vec<Fact>>,
    }

    #[async_trait]
    impl VectorStoreAdapter for OneCandidateStore {
        async fn ensure_collections(&self, _case: &CaseName) -> Result<Vec<(String, bool)>> {
            Ok(Vec::new())
        }

        async fn upsert_chunks(&self, _case: &CaseName, _chunks: &[Chunk]) -> Result<()> {
            Ok(())
        }

        async fn search(&self, _case: &CaseName, _query: &mcb_domain::ports::SearchQuery) -> Result<Vec<mcb_domain::ports::Hit>> {
            Ok(Vec::new())
        }

        async fn delete_document(&self, _case: &CaseName, _document_id: DocumentId) -> Result<u32> {
            Ok(0)
        }

        async fn upsert_fact(&self, _case: &CaseName, fact: &Fact) -> Result<()> {
            self.upserted.lock().expect("lock").push(fact.clone());
            Ok(())
        }

        async fn search_facts(&self, _case: &CaseName, _query_vector: &DenseVector, _top_k: usize) -> Result<Vec<(Fact, f32)>> {
            Ok(vec![(self.candidate.clone(), self.cosine_score)])
        }

        async fn list_facts(&self, _case: &CaseName) -> Result<Vec<Fact>> {
            Ok(Vec::new())
        }
    }

    fn chunk(case: &str, document_id: DocumentId, segment_id: SegmentId) -> Chunk {
        Chunk {
            id: ChunkId::derive(case, document_id, segment_id, 0),
            case_name: case.to_owned(),
            document_id,
            segment_id,
            ordinal: 0,
            text: "chunk text".to_owned(),
            dense_vector: None,
            sparse_keywords: SparseVector::default(),
            sparse_citations: SparseVector::default(),
            token_count: 10,
            metadata: ChunkMetadata {
                document_type: DocumentType::Email,
                page_span: PageSpan::new(0, 0),
                bates_start: None,
                bates_end: None,
                production_batch: None,
                producing_party: None,
                has_citations: false,
                citation_count: 0,
                has_monetary: false,
                has_dates: false,
            },
        }
    }

    fn existing_fact(case: &str, document_id: DocumentId) -> Fact {
        Fact {
            id: FactId::new(),
            case_name: case.to_owned(),
            document_id,
            chunk_ids: HashSet::new(),
            content: "the defendant ran the red light".to_owned(),
            category: FactCategory::Liability,
            entities: HashMap::new(),
            date_references: Vec::new(),
            confidence: 0.9,
            source_snippet: String::new(),
            page: 0,
            bbox: None,
            is_edited: false,
            is_deleted: false,
            edit_history: Vec::new(),
            review_status: ReviewStatus::Unreviewed,
        }
    }

    fn segment(case: &str, document_id: DocumentId, segment_id: SegmentId) -> Segment {
        Segment {
            id: segment_id,
            document_id,
            case_name: case.to_owned(),
            page_span: PageSpan::new(0, 0),
            document_type: DocumentType::Email,
            title: None,
            confidence: 0.9,
            bates_range: None,
            boundary_indicators: vec!["document start".to_owned()],
            needs_ocr: false,
        }
    }

    #[tokio::test]
    async fn low_cosine_candidate_is_not_merged_despite_identical_text() {
        let case = CaseName::parse("case1").expect("valid");
        let document_id = DocumentId::new();
        let segment_id = SegmentId::new();
        let candidate = existing_fact("case1", document_id);
        let raw_fact = json!({
            "content": candidate.content,
            "category": "Liability",
            "confidence": 0.9,
            "page": 0,
        });
        let store = Arc::new(OneCandidateStore {
            candidate: candidate.clone(),
            cosine_score: 0.2,
            upserted: Mutex::new(Vec::new()),
        });
        let extractor = HttpFactExtractor::new(Arc::new(StubLlm { raw_facts: vec![raw_fact] }), Arc::new(StubDenseEncoder), store.clone());

        let produced = extractor
            .extract(&case, &segment("case1", document_id, segment_id), &[chunk("case1", document_id, segment_id)])
            .await
            .expect("extract ok");

        assert_eq!(produced.len(), 1);
        assert_ne!(produced[0].id, candidate.id, "a candidate below the cosine floor must not be merged");
    }

    #[tokio::test]
    async fn high_cosine_and_matching_text_merges_into_the_candidate() {
        let case = CaseName::parse("case1").expect("valid");
        let document_id = DocumentId::new();
        let segment_id = SegmentId::new();
        let candidate = existing_fact("case1", document_id);
        let raw_fact = json!({
            "content": candidate.content,
            "category": "Liability",
            "confidence": 0.9,
            "page": 0,
        });
        let store = Arc::new(OneCandidateStore {
            candidate: candidate.clone(),
            cosine_score: 0.99,
            upserted: Mutex::new(Vec::new()),
        });
        let extractor = HttpFactExtractor::new(Arc::new(StubLlm { raw_facts: vec![raw_fact] }), Arc::new(StubDenseEncoder), store.clone());

        let produced = extractor
            .extract(&case, &segment("case1", document_id, segment_id), &[chunk("case1", document_id, segment_id)])
            .await
            .expect("extract ok");

        assert_eq!(produced.len(), 1);
        assert_eq!(produced[0].id, candidate.id, "a candidate clearing both thresholds must be merged");
    }
}

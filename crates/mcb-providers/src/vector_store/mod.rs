//! In-process, case-isolated vector store with weighted RRF hybrid search (§4.6).

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mcb_domain::constants::{DEFAULT_RRF_K, DEFAULT_UPSERT_BATCH_SIZE};
use mcb_domain::entities::{Chunk, Fact};
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{DenseEncoder, Hit, SearchQuery, VectorStoreAdapter};
use mcb_domain::value_objects::{AuxiliaryCollection, CaseName, ChunkId, DenseVector, DocumentId, FactId, SparseVector};
use std::collections::HashMap;
use std::sync::Arc;

fn cosine(a: &DenseVector, b: &DenseVector) -> f32 {
    if a.0.len() != b.0.len() || a.0.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.0.iter().zip(b.0.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.0.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.0.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn sparse_overlap(a: &SparseVector, b: &SparseVector) -> f32 {
    a.0.iter().filter_map(|(k, v)| b.0.get(k).map(|w| v * w)).sum()
}

fn rank_by<T>(items: &[(T, f32)]) -> HashMap<usize, usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| items[b].1.total_cmp(&items[a].1));
    order
        .into_iter()
        .enumerate()
        .filter(|(_, idx)| items[*idx].1 > 0.0)
        .map(|(rank, idx)| (idx, rank))
        .collect()
}

/// Case-scoped, in-process chunk/fact storage backing [`VectorStoreAdapter`].
///
/// Facts carry no dense vector in [`Fact`] itself (§3: vectors are a storage
/// concern, not a domain field), so this adapter holds its own embedder to
/// vectorize fact content on upsert, alongside a per-case fact-vector index
/// used only by `search_facts`.
pub struct InProcessVectorStore {
    chunk_collections: DashMap<String, DashMap<ChunkId, Chunk>>,
    fact_collections: DashMap<String, DashMap<FactId, Fact>>,
    fact_vectors: DashMap<String, DashMap<FactId, DenseVector>>,
    hybrid_collections: DashMap<String, ()>,
    /// Reverse index used to enforce cross-case isolation on `search`: a
    /// `documentId` filter naming a document owned by a different case must
    /// be rejected before any collection is touched (§6.3's "cross-case
    /// isolation attempt" case).
    document_owner: DashMap<DocumentId, String>,
    fact_encoder: Arc<dyn DenseEncoder>,
}

impl InProcessVectorStore {
    #[must_use]
    pub fn new(fact_encoder: Arc<dyn DenseEncoder>) -> Self {
        Self {
            chunk_collections: DashMap::new(),
            fact_collections: DashMap::new(),
            fact_vectors: DashMap::new(),
            hybrid_collections: DashMap::new(),
            document_owner: DashMap::new(),
            fact_encoder,
        }
    }

    fn ensure_chunk_collection(&self, name: &str) -> bool {
        match self.chunk_collections.entry(name.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(DashMap::new());
                true
            }
        }
    }

    fn ensure_fact_collection(&self, name: &str) -> bool {
        match self.fact_collections.entry(name.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(DashMap::new());
                true
            }
        }
    }

    fn ensure_hybrid_collection(&self, name: &str) -> bool {
        match self.hybrid_collections.entry(name.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(());
                true
            }
        }
    }

    /// Configured dense dimensionality D (§3), shared by chunk and fact
    /// vectors since both are produced by the same dense encoder wired in at
    /// construction.
    fn dense_dimensions(&self) -> usize {
        self.fact_encoder.dimensions()
    }
}

#[async_trait]
impl VectorStoreAdapter for InProcessVectorStore {
    async fn ensure_collections(&self, case: &CaseName) -> Result<Vec<(String, bool)>> {
        let chunks_created = self.ensure_chunk_collection(&case.chunks_collection());
        let hybrid_created = self.ensure_hybrid_collection(&case.hybrid_collection());
        let facts_created = self.ensure_fact_collection(&case.facts_collection());
        let depositions_created = self.ensure_chunk_collection(&case.auxiliary_collection(AuxiliaryCollection::Depositions));
        let exhibits_created = self.ensure_chunk_collection(&case.auxiliary_collection(AuxiliaryCollection::Exhibits));
        let timeline_created = self.ensure_fact_collection(&case.auxiliary_collection(AuxiliaryCollection::Timeline));
        Ok(vec![
            (case.chunks_collection(), chunks_created),
            (case.hybrid_collection(), hybrid_created),
            (case.facts_collection(), facts_created),
            (case.auxiliary_collection(AuxiliaryCollection::Depositions), depositions_created),
            (case.auxiliary_collection(AuxiliaryCollection::Exhibits), exhibits_created),
            (case.auxiliary_collection(AuxiliaryCollection::Timeline), timeline_created),
        ])
    }

    async fn upsert_chunks(&self, case: &CaseName, chunks: &[Chunk]) -> Result<()> {
        let expected_dimensions = self.dense_dimensions();
        for chunk in chunks {
            if chunk.case_name != case.as_str() {
                return Err(Error::access_denied(format!(
                    "chunk case '{}' does not match active case '{}'",
                    chunk.case_name,
                    case.as_str()
                )));
            }
            if let Some(dense) = &chunk.dense_vector {
                if dense.0.len() != expected_dimensions {
                    return Err(Error::input_invalid(format!(
                        "chunk {} has a {}-dimensional dense vector, expected {expected_dimensions}",
                        chunk.id,
                        dense.0.len()
                    )));
                }
            }
        }
        self.ensure_chunk_collection(&case.chunks_collection());
        let collection = self
            .chunk_collections
            .get(&case.chunks_collection())
            .ok_or_else(|| Error::internal("chunk collection missing after ensure"))?;
        for batch in chunks.chunks(DEFAULT_UPSERT_BATCH_SIZE) {
            for chunk in batch {
                self.document_owner.entry(chunk.document_id).or_insert_with(|| case.as_str().to_owned());
                collection.insert(chunk.id, chunk.clone());
            }
        }
        Ok(())
    }

    async fn search(&self, case: &CaseName, query: &SearchQuery) -> Result<Vec<Hit>> {
        if let Some(filtered_document_id) = query.filters.get("documentId") {
            if let Some(owner) = self.document_owner.iter().find(|e| e.key().to_string() == *filtered_document_id) {
                if owner.value() != case.as_str() {
                    return Err(Error::access_denied(format!(
                        "documentId '{filtered_document_id}' does not belong to case '{}'",
                        case.as_str()
                    )));
                }
            }
        }

        let Some(collection) = self.chunk_collections.get(&case.chunks_collection()) else {
            return Ok(Vec::new());
        };
        let hybrid = self.hybrid_collections.contains_key(&case.hybrid_collection());

        let entries: Vec<Chunk> = collection
            .iter()
            .map(|r| r.value().clone())
            .filter(|c| {
                query
                    .filters
                    .iter()
                    .all(|(k, v)| c.to_payload_map().get(k).is_some_and(|val| val.to_string().trim_matches('"') == v))
            })
            .collect();

        let dense_scores: Vec<(ChunkId, f32)> = entries
            .iter()
            .map(|c| (c.id, c.dense_vector.as_ref().map_or(0.0, |v| cosine(v, &query.dense_vector))))
            .collect();
        let dense_ranks = rank_by(&dense_scores);

        let mut fused: HashMap<ChunkId, f32> = HashMap::new();
        for (idx, (chunk_id, _)) in dense_scores.iter().enumerate() {
            if let Some(&rank) = dense_ranks.get(&idx) {
                *fused.entry(*chunk_id).or_insert(0.0) += query.weights.dense / (DEFAULT_RRF_K as f32 + rank as f32 + 1.0);
            }
        }

        if hybrid {
            let keyword_scores: Vec<(ChunkId, f32)> = entries
                .iter()
                .map(|c| (c.id, sparse_overlap(&c.sparse_keywords, &query.sparse_keywords)))
                .collect();
            let keyword_ranks = rank_by(&keyword_scores);
            for (idx, (chunk_id, _)) in keyword_scores.iter().enumerate() {
                if let Some(&rank) = keyword_ranks.get(&idx) {
                    *fused.entry(*chunk_id).or_insert(0.0) += query.weights.keyword / (DEFAULT_RRF_K as f32 + rank as f32 + 1.0);
                }
            }

            let citation_scores: Vec<(ChunkId, f32)> = entries
                .iter()
                .map(|c| (c.id, sparse_overlap(&c.sparse_citations, &query.sparse_citations)))
                .collect();
            let citation_ranks = rank_by(&citation_scores);
            for (idx, (chunk_id, _)) in citation_scores.iter().enumerate() {
                if let Some(&rank) = citation_ranks.get(&idx) {
                    *fused.entry(*chunk_id).or_insert(0.0) += query.weights.citation / (DEFAULT_RRF_K as f32 + rank as f32 + 1.0);
                }
            }
        }

        let mut by_id: HashMap<ChunkId, &Chunk> = entries.iter().map(|c| (c.id, c)).collect();
        let mut ranked: Vec<(ChunkId, f32)> = fused.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(query.top_k);

        Ok(ranked
            .into_iter()
            .filter_map(|(chunk_id, score)| {
                by_id.remove(&chunk_id).map(|chunk| Hit {
                    chunk_id,
                    score,
                    payload: chunk.to_payload_map(),
                })
            })
            .collect())
    }

    async fn delete_document(&self, case: &CaseName, document_id: DocumentId) -> Result<u32> {
        let Some(collection) = self.chunk_collections.get(&case.chunks_collection()) else {
            return Ok(0);
        };
        let to_remove: Vec<ChunkId> = collection
            .iter()
            .filter(|r| r.value().document_id == document_id)
            .map(|r| *r.key())
            .collect();
        for chunk_id in &to_remove {
            collection.remove(chunk_id);
        }
        Ok(to_remove.len() as u32)
    }

    async fn upsert_fact(&self, case: &CaseName, fact: &Fact) -> Result<()> {
        if fact.case_name != case.as_str() {
            return Err(Error::access_denied(format!(
                "fact case '{}' does not match active case '{}'",
                fact.case_name,
                case.as_str()
            )));
        }
        self.ensure_fact_collection(&case.facts_collection());
        let dense = self.fact_encoder.embed(&fact.content).await?;
        let expected_dimensions = self.dense_dimensions();
        if dense.0.len() != expected_dimensions {
            return Err(Error::input_invalid(format!(
                "fact {} embedded to a {}-dimensional vector, expected {expected_dimensions}",
                fact.id,
                dense.0.len()
            )));
        }
        let collection = self
            .fact_collections
            .get(&case.facts_collection())
            .ok_or_else(|| Error::internal("fact collection missing after ensure"))?;
        collection.insert(fact.id, fact.clone());
        self.fact_vectors
            .entry(case.facts_collection())
            .or_insert_with(DashMap::new)
            .insert(fact.id, dense);
        Ok(())
    }

    async fn search_facts(&self, case: &CaseName, query_vector: &DenseVector, top_k: usize) -> Result<Vec<(Fact, f32)>> {
        let Some(collection) = self.fact_collections.get(&case.facts_collection()) else {
            return Ok(Vec::new());
        };
        let vectors = self.fact_vectors.get(&case.facts_collection());
        let mut scored: Vec<(f32, Fact)> = Vec::new();
        for r in collection.iter() {
            let fact = r.value();
            if fact.is_deleted {
                continue;
            }
            let score = vectors
                .as_ref()
                .and_then(|v| v.get(&fact.id).map(|dv| cosine(&dv, query_vector)))
                .unwrap_or(0.0);
            scored.push((score, fact.clone()));
        }
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(top_k);
        Ok(scored.into_iter().map(|(score, fact)| (fact, score)).collect())
    }

    async fn list_facts(&self, case: &CaseName) -> Result<Vec<Fact>> {
        let Some(collection) = self.fact_collections.get(&case.facts_collection()) else {
            return Ok(Vec::new());
        };
        Ok(collection.iter().map(|r| r.value().clone()).filter(|f| !f.is_deleted).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcb_domain::entities::{ChunkMetadata, DocumentType};
    use mcb_domain::ports::SearchWeights;
    use mcb_domain::value_objects::{DocumentId, PageSpan, SegmentId, SPARSE_VECTOR_CAP};
    use std::collections::HashMap as StdHashMap;

    struct StubEncoder;

    #[async_trait]
    impl DenseEncoder for StubEncoder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<DenseVector>> {
            Ok(texts.iter().map(|_| DenseVector(vec![1.0, 0.0])).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn store() -> InProcessVectorStore {
        InProcessVectorStore::new(Arc::new(StubEncoder))
    }

    fn chunk(case: &str, document_id: DocumentId, dense: Vec<f32>) -> Chunk {
        let _ = SPARSE_VECTOR_CAP;
        Chunk {
            id: ChunkId::derive(case, document_id, SegmentId::new(), 0),
            case_name: case.to_owned(),
            document_id,
            segment_id: SegmentId::new(),
            ordinal: 0,
            text: "chunk text".to_owned(),
            dense_vector: Some(DenseVector(dense)),
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

    #[tokio::test]
    async fn upsert_rejects_chunk_from_a_different_case() {
        let store = store();
        let case = CaseName::parse("case1").expect("valid");
        let foreign = chunk("case2", DocumentId::new(), vec![1.0, 0.0]);
        let result = store.upsert_chunks(&case, &[foreign]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn search_finds_the_closest_dense_match() {
        let store = store();
        let case = CaseName::parse("case1").expect("valid");
        let doc = DocumentId::new();
        let near = chunk("case1", doc, vec![1.0, 0.0]);
        let far = chunk("case1", doc, vec![0.0, 1.0]);
        store.upsert_chunks(&case, &[near.clone(), far]).await.expect("ok");

        let query = SearchQuery {
            dense_vector: DenseVector(vec![1.0, 0.0]),
            sparse_keywords: SparseVector::default(),
            sparse_citations: SparseVector::default(),
            top_k: 1,
            filters: StdHashMap::new(),
            weights: SearchWeights::default(),
        };
        let hits = store.search(&case, &query).await.expect("ok");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk_id, near.id);
    }

    #[tokio::test]
    async fn search_rejects_a_documentid_filter_owned_by_another_case() {
        let store = store();
        let case_a = CaseName::parse("case-a").expect("valid");
        let case_b = CaseName::parse("case-b").expect("valid");
        let foreign_doc = DocumentId::new();
        store
            .upsert_chunks(&case_b, &[chunk("case-b", foreign_doc, vec![1.0, 0.0])])
            .await
            .expect("ok");

        let mut filters = StdHashMap::new();
        filters.insert("documentId".to_owned(), foreign_doc.to_string());
        let query = SearchQuery {
            dense_vector: DenseVector(vec![1.0, 0.0]),
            sparse_keywords: SparseVector::default(),
            sparse_citations: SparseVector::default(),
            top_k: 5,
            filters,
            weights: SearchWeights::default(),
        };

        let result = store.search(&case_a, &query).await;
        assert!(matches!(result, Err(Error::AccessDenied { .. })));
    }

    #[tokio::test]
    async fn delete_document_removes_only_its_chunks() {
        let store = store();
        let case = CaseName::parse("case1").expect("valid");
        let doc_a = DocumentId::new();
        let doc_b = DocumentId::new();
        store
            .upsert_chunks(&case, &[chunk("case1", doc_a, vec![1.0, 0.0]), chunk("case1", doc_b, vec![1.0, 0.0])])
            .await
            .expect("ok");
        let removed = store.delete_document(&case, doc_a).await.expect("ok");
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn upsert_rejects_a_dense_vector_of_the_wrong_dimensionality() {
        let store = store();
        let case = CaseName::parse("case1").expect("valid");
        let mismatched = chunk("case1", DocumentId::new(), vec![1.0, 0.0, 0.0]);
        let result = store.upsert_chunks(&case, &[mismatched]).await;
        assert!(matches!(result, Err(Error::InputInvalid { .. })));
    }

    #[tokio::test]
    async fn search_with_a_same_case_document_id_filter_returns_the_matching_chunk() {
        let store = store();
        let case = CaseName::parse("case1").expect("valid");
        let doc = DocumentId::new();
        let target = chunk("case1", doc, vec![1.0, 0.0]);
        store.upsert_chunks(&case, &[target.clone()]).await.expect("ok");

        let mut filters = StdHashMap::new();
        filters.insert("documentId".to_owned(), doc.to_string());
        let query = SearchQuery {
            dense_vector: DenseVector(vec![1.0, 0.0]),
            sparse_keywords: SparseVector::default(),
            sparse_citations: SparseVector::default(),
            top_k: 5,
            filters,
            weights: SearchWeights::default(),
        };

        let hits = store.search(&case, &query).await.expect("ok");
        assert_eq!(hits.len(), 1, "a same-case documentId filter must not be treated as a foreign-case miss");
        assert_eq!(hits[0].chunk_id, target.id);
        assert_eq!(hits[0].payload["documentId"], doc.to_string());
        assert_eq!(hits[0].payload["caseName"], "case1");
    }
}

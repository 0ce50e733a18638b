//! Hybrid search + timeline projection use case (§4.6, §10.6).
//!
//! Composes the dense/sparse encoders with the vector store's hybrid search,
//! the way the reference codebase's `ContextServiceImpl` composes an
//! embedding provider with a vector-store provider for `store_chunks`/
//! `search_similar`. `timeline` is the supplemented read-only projection
//! from §10.6: groups a case's facts by `dateReferences` with no new
//! collection or write path.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mcb_domain::entities::{Fact, FactCategory};
use mcb_domain::error::Result;
use mcb_domain::ports::{CitationEncoder, DenseEncoder, Hit, KeywordEncoder, SearchQuery, SearchWeights, VectorStoreAdapter};
use mcb_domain::value_objects::CaseName;
use serde::{Deserialize, Serialize};

/// One entry in a case's chronological fact timeline (§10.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub date: DateTime<Utc>,
    pub fact_id: String,
    pub document_id: String,
    pub category: FactCategory,
    pub content: String,
}

/// Composes the encoder ports with the vector store for query-time search
/// and for the facts-timeline read projection.
#[derive(Clone)]
pub struct HybridSearchService {
    vector_store: Arc<dyn VectorStoreAdapter>,
    dense_encoder: Arc<dyn DenseEncoder>,
    keyword_encoder: Arc<dyn KeywordEncoder>,
    citation_encoder: Arc<dyn CitationEncoder>,
}

impl HybridSearchService {
    /// Wire the encoder and vector-store ports this service composes.
    #[must_use]
    pub fn new(
        vector_store: Arc<dyn VectorStoreAdapter>,
        dense_encoder: Arc<dyn DenseEncoder>,
        keyword_encoder: Arc<dyn KeywordEncoder>,
        citation_encoder: Arc<dyn CitationEncoder>,
    ) -> Self {
        Self {
            vector_store,
            dense_encoder,
            keyword_encoder,
            citation_encoder,
        }
    }

    /// Embed `query_text` with every configured signal and fuse results via
    /// the vector store's weighted RRF hybrid search (§4.6).
    ///
    /// # Errors
    ///
    /// Returns an error if embedding or the backend search fails.
    pub async fn search(
        &self,
        case: &CaseName,
        query_text: &str,
        top_k: usize,
        filters: HashMap<String, String>,
        weights: SearchWeights,
    ) -> Result<Vec<Hit>> {
        let dense_vector = self.dense_encoder.embed(query_text).await?;
        let sparse_keywords = self.keyword_encoder.encode(query_text);
        let sparse_citations = self.citation_encoder.encode(query_text).sparse;
        let query = SearchQuery {
            dense_vector,
            sparse_keywords,
            sparse_citations,
            top_k,
            filters,
            weights,
        };
        self.vector_store.search(case, &query).await
    }

    /// Group every non-deleted fact in the case into a chronological
    /// timeline, ordered by the earliest resolved date reference (facts
    /// with no resolvable date sort last, by `fact_id` for determinism).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend scan fails.
    pub async fn timeline(&self, case: &CaseName) -> Result<Vec<TimelineEntry>> {
        let facts = self.vector_store.list_facts(case).await?;
        let mut entries: Vec<TimelineEntry> = facts
            .into_iter()
            .filter(|f| !f.is_deleted)
            .flat_map(Self::entries_for_fact)
            .collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.fact_id.cmp(&b.fact_id)));
        Ok(entries)
    }

    fn entries_for_fact(fact: Fact) -> Vec<TimelineEntry> {
        let dates: Vec<DateTime<Utc>> = fact.date_references.iter().filter_map(|d| d.date).collect();
        let dates = if dates.is_empty() { vec![DateTime::<Utc>::MAX_UTC] } else { dates };
        dates
            .into_iter()
            .map(|date| TimelineEntry {
                date,
                fact_id: fact.id.to_string(),
                document_id: fact.document_id.to_string(),
                category: fact.category,
                content: fact.content.clone(),
            })
            .collect()
    }
}

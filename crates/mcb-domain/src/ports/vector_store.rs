//! Vector store adapter port (§4.6).

use std::collections::HashMap;

use async_trait::async_trait;

use crate::entities::{Chunk, Fact};
use crate::error::Result;
use crate::value_objects::{CaseName, ChunkId, DenseVector, DocumentId, SparseVector};

/// Relative weights applied to each ranked lookup before RRF fusion (§4.6).
#[derive(Debug, Clone, Copy)]
pub struct SearchWeights {
    pub dense: f32,
    pub keyword: f32,
    pub citation: f32,
}

impl Default for SearchWeights {
    fn default() -> Self {
        Self {
            dense: 1.0,
            keyword: 1.0,
            citation: 1.0,
        }
    }
}

/// Hybrid-search request parameters (§4.6).
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub dense_vector: DenseVector,
    pub sparse_keywords: SparseVector,
    pub sparse_citations: SparseVector,
    pub top_k: usize,
    pub filters: HashMap<String, String>,
    pub weights: SearchWeights,
}

/// One ranked hit, fused across the dense/keyword/citation lookups.
#[derive(Debug, Clone)]
pub struct Hit {
    pub chunk_id: ChunkId,
    pub score: f32,
    pub payload: HashMap<String, serde_json::Value>,
}

/// Persists chunks and performs hybrid search, fully case-isolated (§4.6).
///
/// Case-isolation invariant: every read and write must include `caseName` in
/// either the target collection or as a mandatory filter. Implementations
/// must refuse any call whose requested collection does not start with the
/// active `caseName` or is not in the shared set (testable property 2).
#[async_trait]
pub trait VectorStoreAdapter: Send + Sync {
    /// Idempotently create (or confirm) this case's collections with their
    /// required payload indexes. Returns one boolean per collection: `true`
    /// if it was created by this call, `false` if it already existed.
    ///
    /// # Errors
    ///
    /// Returns an error if collection creation fails against the backend.
    async fn ensure_collections(&self, case: &CaseName) -> Result<Vec<(String, bool)>>;

    /// Upsert chunks, batched in groups (default 64, §4.6). Chunk ids are
    /// deterministic so repeated calls with identical input are idempotent
    /// (testable property 6).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::AccessDenied`] if any chunk's `case_name`
    /// does not match `case`, and [`crate::error::Error::Transient`] /
    /// [`crate::error::Error::BackendUnavailable`] on backend failures.
    async fn upsert_chunks(&self, case: &CaseName, chunks: &[Chunk]) -> Result<()>;

    /// Hybrid search: dense, keyword and citation lookups fused by weighted
    /// RRF (k=60 by default). Degrades to dense-only if the hybrid collection
    /// is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable.
    async fn search(&self, case: &CaseName, query: &SearchQuery) -> Result<Vec<Hit>>;

    /// Remove all chunks belonging to `document_id`, returning the count removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend delete fails.
    async fn delete_document(&self, case: &CaseName, document_id: DocumentId) -> Result<u32>;

    /// Upsert one fact into `<case>_facts` (§4.8).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend upsert fails.
    async fn upsert_fact(&self, case: &CaseName, fact: &Fact) -> Result<()>;

    /// Dense-only search over `<case>_facts`, used by the fact extractor's
    /// dedup step (§4.8) and by timeline/search read paths. Each hit carries
    /// its cosine score against `query_vector`, since the dedup step gates a
    /// merge on the score as well as on the fact content.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend search fails.
    async fn search_facts(
        &self,
        case: &CaseName,
        query_vector: &DenseVector,
        top_k: usize,
    ) -> Result<Vec<(Fact, f32)>>;

    /// List every non-deleted fact in `<case>_facts`, used by timeline
    /// assembly (§10.6) which groups the whole case's facts rather than
    /// ranking against a query vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend scan fails.
    async fn list_facts(&self, case: &CaseName) -> Result<Vec<Fact>>;
}

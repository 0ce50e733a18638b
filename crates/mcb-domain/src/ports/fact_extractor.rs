//! Fact extractor port (§4.8).

use async_trait::async_trait;

use crate::entities::{Chunk, Fact, Segment};
use crate::error::Result;
use crate::value_objects::CaseName;

/// Turns a segment's chunks into structured, deduplicated [`Fact`]s.
///
/// Implementations own the full §4.8 algorithm (split into units, LLM
/// extraction, schema validation, embedding, cross-document dedup against
/// the case's fact collection); the orchestrator only calls this once per
/// gated segment and records the result.
#[async_trait]
pub trait FactExtractor: Send + Sync {
    /// Extract facts from `segment`'s `chunks`. Callers must have already
    /// applied the `documentType` gate (§4.8); this port does not re-check it.
    ///
    /// # Errors
    ///
    /// Returns an error if the LLM fact-extraction backend is unavailable.
    /// Schema-invalid individual facts are dropped, not errors.
    async fn extract(&self, case: &CaseName, segment: &Segment, chunks: &[Chunk]) -> Result<Vec<Fact>>;

    /// Apply an edit to an existing fact: append to `editHistory`, re-embed, update the vector.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::NotFound`] if `fact_id` is unknown.
    async fn edit_fact(
        &self,
        case: &CaseName,
        fact_id: &str,
        new_content: String,
        user_id: String,
        reason: String,
    ) -> Result<Fact>;

    /// Soft-delete a fact: set `isDeleted`, leave the vector in place.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::NotFound`] if `fact_id` is unknown.
    async fn delete_fact(
        &self,
        case: &CaseName,
        fact_id: &str,
        user_id: String,
        reason: String,
    ) -> Result<()>;
}

//! Document registry / deduplication port (§4.7).

use async_trait::async_trait;

use crate::entities::{Document, DuplicateRecord};
use crate::error::Result;
use crate::value_objects::CaseName;

/// Outcome of registering a newly ingested document.
#[derive(Debug, Clone)]
pub enum RegisterOutcome {
    /// First time these bytes have been seen in this case; proceed with processing.
    Primary,
    /// Bytes already exist in this case; the pipeline should skip to
    /// `document.duplicate` without producing new chunks.
    Duplicate(DuplicateRecord),
}

/// Detects identical re-ingestions within a case (§4.7).
///
/// Implementations must serialize read-then-write of `content_hash` per case
/// (§5: "DocumentRegistry operations ... are serialized per case using a
/// case-keyed mutex") so two concurrent ingests of the same bytes cannot both
/// observe `Primary`.
#[async_trait]
pub trait DocumentRegistry: Send + Sync {
    /// Register `document` under `case`, returning whether it is the primary
    /// record or a duplicate of one already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry's backing store is unavailable.
    async fn register(&self, case: &CaseName, document: &Document) -> Result<RegisterOutcome>;
}

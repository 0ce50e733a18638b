//! Boundary detector port (§4.2).

use async_trait::async_trait;

use crate::entities::Segment;
use crate::error::Result;
use crate::value_objects::{DocumentId, PageFeatures};

/// Partitions a document's page-feature stream into [`Segment`]s.
///
/// Implementations must satisfy the output invariants of §4.2: segments are
/// sorted, non-overlapping, contiguous, and cover `[0, pageCount-1]`; every
/// segment carries at least one boundary indicator.
#[async_trait]
pub trait BoundaryDetector: Send + Sync {
    /// Detect segment boundaries for one document.
    ///
    /// # Errors
    ///
    /// Returns an error if `pages` cannot be reconciled into a valid partition.
    async fn detect(
        &self,
        case_name: &str,
        document_id: DocumentId,
        pages: &[PageFeatures],
    ) -> Result<Vec<Segment>>;
}

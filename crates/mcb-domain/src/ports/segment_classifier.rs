//! Segment classifier port (§4.3).

use async_trait::async_trait;

use crate::entities::DocumentType;
use crate::error::Result;

/// Result of classifying one segment's text.
#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub document_type: DocumentType,
    /// 0..1
    pub confidence: f32,
    pub title: Option<String>,
}

/// Assigns a [`DocumentType`] to a segment and refines its title.
///
/// Implementations are expected to be hybrid (deterministic rules first,
/// LLM fallback below a confidence cutoff) per §4.3, but the port itself is
/// agnostic to that strategy — it is one call, idempotent and deterministic
/// given the same inputs and rule-set version.
#[async_trait]
pub trait SegmentClassifier: Send + Sync {
    /// Classify `text` (a segment's extracted text), optionally aided by
    /// `boundary_indicators` surfaced by the boundary detector.
    ///
    /// # Errors
    ///
    /// Returns an error if classification could not be completed (e.g. the
    /// LLM fallback timed out); callers should record this as a
    /// [`crate::error::Error::ComponentFailure`] against the segment, not abort the job.
    async fn classify(
        &self,
        text: &str,
        boundary_indicators: &[String],
    ) -> Result<ClassificationOutcome>;
}

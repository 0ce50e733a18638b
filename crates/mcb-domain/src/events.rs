//! Progress-bus event types (§4.9, §6.2).
//!
//! Mirrors the reference codebase's `DomainEvent` shape (a flat enum of
//! struct variants, one doc comment per variant) but scoped to the
//! per-job progress protocol rather than indexing/cache/service events.

use serde::{Deserialize, Serialize};

use crate::entities::{DocumentType, FactCategory, JobTotals};
use crate::value_objects::BatesRange;

/// One progress event published on a `case:{caseName}:job:{processingId}` topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum ProgressEvent {
    /// Job accepted and starting
    #[serde(rename = "job.started")]
    JobStarted { total_files: u32 },

    /// A document was ingested (not a duplicate)
    #[serde(rename = "document.found")]
    DocumentFound {
        document_id: String,
        title: Option<String>,
        document_type: DocumentType,
        page_count: u32,
        bates_range: Option<BatesRange>,
        confidence: f32,
    },

    /// A document's bytes matched an existing document in the same case
    #[serde(rename = "document.duplicate")]
    DocumentDuplicate {
        document_id: String,
        original_id: String,
    },

    /// Chunks were produced for a segment
    #[serde(rename = "segment.chunking")]
    SegmentChunking {
        document_id: String,
        segment_id: String,
        chunks_created: u32,
        progress_percent: f32,
    },

    /// A segment's chunks are being embedded
    #[serde(rename = "segment.embedding")]
    SegmentEmbedding {
        document_id: String,
        segment_id: String,
        progress_percent: f32,
    },

    /// A segment's chunks were upserted into the vector store
    #[serde(rename = "segment.stored")]
    SegmentStored {
        document_id: String,
        segment_id: String,
        vectors_stored: u32,
    },

    /// A fact was extracted and stored
    #[serde(rename = "fact.extracted")]
    FactExtracted {
        document_id: String,
        fact_id: String,
        category: FactCategory,
        confidence: f32,
    },

    /// Terminal: job completed successfully
    #[serde(rename = "job.completed")]
    JobCompleted { totals: JobTotals, elapsed_seconds: f64 },

    /// Terminal: job failed
    #[serde(rename = "job.failed")]
    JobFailed {
        stage: String,
        error: String,
        document_id: Option<String>,
    },

    /// Terminal: job was cancelled
    #[serde(rename = "job.cancelled")]
    JobCancelled { reason: String },
}

impl ProgressEvent {
    /// True for any of the three terminal event kinds (§4.9, §8 invariant 5:
    /// "the last event on J's topic is one of {completed, failed, cancelled}").
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::JobCompleted { .. } | Self::JobFailed { .. } | Self::JobCancelled { .. }
        )
    }
}

/// One frame on the wire (§6.2): `{ seq, ts, type, payload }`, plus the
/// server's `hello { lastSeq }` greeting sent on subscribe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "frame")]
pub enum ProgressFrame {
    /// Sent once when a subscriber attaches to a topic
    Hello { last_seq: u64 },
    /// A published event, tagged with its monotonically increasing topic sequence number
    Event {
        seq: u64,
        ts: chrono::DateTime<chrono::Utc>,
        #[serde(flatten)]
        event: ProgressEvent,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_is_terminal() {
        let e = ProgressEvent::JobCompleted {
            totals: JobTotals::default(),
            elapsed_seconds: 1.0,
        };
        assert!(e.is_terminal());
    }

    #[test]
    fn started_is_not_terminal() {
        let e = ProgressEvent::JobStarted { total_files: 1 };
        assert!(!e.is_terminal());
    }
}

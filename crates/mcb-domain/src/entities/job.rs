//! ProcessingJob entity and its state machine (§3, §4.1, §7).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::ProcessingId;

/// Lifecycle state of a [`ProcessingJob`]. Transitions are one-way:
/// `Queued -> Running -> {Completed, Failed, Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    /// True for any of the three terminal states (testable property 5).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Running totals for one job, published alongside `Status` snapshots.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct JobTotals {
    pub files_found: u32,
    pub docs_processed: u32,
    pub chunks_stored: u32,
    pub facts_extracted: u32,
    pub errors: u32,
}

/// One entry in `Job.errors`: a component failure recorded against a
/// specific document/segment rather than aborting the job (§7 propagation policy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobErrorEntry {
    pub document_id: Option<String>,
    pub segment_id: Option<String>,
    pub stage: String,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

/// A single document-processing job driven by the orchestrator (§4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingJob {
    pub id: ProcessingId,
    pub case_name: String,
    pub state: JobState,
    pub totals: JobTotals,
    pub errors: Vec<JobErrorEntry>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl ProcessingJob {
    /// Create a freshly queued job for `case_name`.
    #[must_use]
    pub fn queued(case_name: String) -> Self {
        Self {
            id: ProcessingId::new(),
            case_name,
            state: JobState::Queued,
            totals: JobTotals::default(),
            errors: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
            last_error: None,
        }
    }

    /// Record a recoverable per-segment/document failure without aborting the job.
    pub fn record_error(&mut self, entry: JobErrorEntry) {
        self.totals.errors += 1;
        self.errors.push(entry);
    }

    /// Transition to a terminal state, stamping `completed_at`.
    pub fn finish(&mut self, state: JobState) {
        debug_assert!(state.is_terminal(), "finish() requires a terminal state");
        self.state = state;
        self.completed_at = Some(Utc::now());
    }

    /// Testable property 5: `errors + docsProcessed <= filesFound`.
    #[must_use]
    pub fn totals_within_bounds(&self) -> bool {
        self.totals.errors + self.totals.docs_processed <= self.totals.files_found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_job_starts_in_queued_state() {
        let job = ProcessingJob::queued("case1".to_owned());
        assert_eq!(job.state, JobState::Queued);
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn finish_stamps_completion_time() {
        let mut job = ProcessingJob::queued("case1".to_owned());
        job.finish(JobState::Completed);
        assert!(job.completed_at.is_some());
        assert!(job.state.is_terminal());
    }

    #[test]
    fn record_error_increments_totals_and_errors() {
        let mut job = ProcessingJob::queued("case1".to_owned());
        job.record_error(JobErrorEntry {
            document_id: Some("doc1".to_owned()),
            segment_id: None,
            stage: "classifier".to_owned(),
            message: "boom".to_owned(),
            occurred_at: Utc::now(),
        });
        assert_eq!(job.totals.errors, 1);
        assert_eq!(job.errors.len(), 1);
    }
}

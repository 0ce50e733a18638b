//! Job orchestration port (§4.1).
//!
//! Kept in the domain layer as a trait, not a concrete type, so `mcb-server`
//! depends only on the contract; the real implementation lives in
//! `mcb-application` and composes the other ports under bounded concurrency.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::entities::ProcessingJob;
use crate::error::Result;
use crate::value_objects::{CaseName, ProcessingId};

/// A `Submit` request: a case plus one input reference resolved by a
/// [`crate::ports::FileSource`], carrying the per-job feature flags and
/// production metadata from the Submit contract (§4.1).
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub case_name: CaseName,
    pub user_id: String,
    pub input_reference: String,
    pub production_metadata: HashMap<String, String>,
    pub enable_fact_extraction: bool,
    /// Accepted and carried through per the Submit contract; deficiency
    /// analysis itself is external glue, out of scope here (§1).
    pub enable_deficiency_analysis: bool,
    /// Optional ids of a related RTP (Request to Produce) or OC (Opposing
    /// Counsel) response document, used only as cross-references on facts.
    pub rtp_document_id: Option<String>,
    pub oc_response_document_id: Option<String>,
}

/// Accepts, tracks and cancels document-processing jobs (§4.1).
///
/// `submit` returns as soon as the job is queued; processing runs in the
/// background and is observable via `status` or a [`crate::ports::ProgressBus`] subscription.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Queue a new job and return immediately with its id (testable property 1).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::AccessDenied`] if the caller lacks
    /// write access to the case (checked via [`crate::ports::AccessOracle`]).
    async fn submit(&self, request: JobRequest) -> Result<ProcessingId>;

    /// Fetch the current snapshot of a job.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::NotFound`] if `id` is unknown.
    async fn status(&self, id: ProcessingId) -> Result<ProcessingJob>;

    /// Request cooperative cancellation of a running job (testable property 4).
    /// A no-op (not an error) if the job is already terminal.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::NotFound`] if `id` is unknown.
    async fn cancel(&self, id: ProcessingId) -> Result<()>;
}

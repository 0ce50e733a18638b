//! Application layer constants.
//!
//! Defaults a job runs with before `mcb-infrastructure::Config` overrides
//! them; kept separate from `mcb-domain::constants` because these tune
//! orchestration behavior rather than domain invariants.

/// Publish a `segment.*` progress event every N segments processed, to avoid
/// flooding slow subscribers on large documents.
pub const PROGRESS_UPDATE_INTERVAL: usize = 5;

/// Fraction of a document's segments that may fail before the document (not
/// the job) is aborted (§4.1 failure semantics).
pub const DOCUMENT_FAILURE_RATE_THRESHOLD: f32 = 0.25;

/// Retry budget for idempotent infrastructure calls (vector upserts, document
/// persistence) before escalating `Transient` to `BackendUnavailable`.
pub const MAX_RETRY_ATTEMPTS: u32 = 5;
/// Backoff ceiling for the retry budget above.
pub const RETRY_BACKOFF_CEILING_MS: u64 = 30_000;

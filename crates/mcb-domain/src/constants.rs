//! Default tuning constants named throughout the design (§4, §5).
//!
//! These are the hard-coded fallbacks `mcb-infrastructure::Config` starts
//! from before layering in file/environment overrides; they live in the
//! domain crate because several ports (chunker, vector store) use them
//! directly in tests without needing the infrastructure crate.

/// Files processed concurrently per job (§5: N).
pub const DEFAULT_FILE_CONCURRENCY: usize = 4;
/// Segments processed concurrently per document (§5: M).
pub const DEFAULT_SEGMENT_CONCURRENCY: usize = 8;
/// Embedding batches in flight per job (§5: B).
pub const DEFAULT_EMBEDDING_BATCH_PARALLELISM: usize = 2;
/// Vector upsert batches in flight per case (§5: U).
pub const DEFAULT_UPSERT_PARALLELISM: usize = 4;

/// Soft-boundary change-score threshold τ (§4.2).
pub const DEFAULT_SOFT_BOUNDARY_THRESHOLD: f32 = 0.55;
/// Multiplicative relaxation applied to τ for OCR-only PDFs (§4.2).
pub const DEFAULT_OCR_THRESHOLD_RELAXATION: f32 = 0.75;
/// Hard-boundary rule matches are emitted with at least this confidence (§4.2).
pub const HARD_BOUNDARY_MIN_CONFIDENCE: f32 = 0.8;
/// Confidence assigned to gap-fill synthetic segments when no soft score exists (§4.2).
pub const GAP_FILL_DEFAULT_CONFIDENCE: f32 = 0.3;

/// Deterministic-classifier confidence below which the LLM fallback runs (§4.3).
pub const DEFAULT_CLASSIFIER_CONFIDENCE_CUTOFF: f32 = 0.6;
/// Number of leading lines the deterministic classifier inspects (§4.3).
pub const DEFAULT_CLASSIFIER_HEADER_LINES: usize = 40;

/// Target chunk size in tokens, T (§4.4).
pub const DEFAULT_CHUNK_TARGET_TOKENS: u32 = 1400;
/// Chunk overlap in tokens, O (§4.4).
pub const DEFAULT_CHUNK_OVERLAP_TOKENS: u32 = 200;
/// Paragraphs longer than `2 * T` tokens are force-split (§4.4).
pub const CHUNK_FORCE_SPLIT_MULTIPLE: u32 = 2;

/// Max dense-encoder batch size (§4.5).
pub const DEFAULT_DENSE_BATCH_SIZE: usize = 32;

/// Reciprocal-rank-fusion constant k for hybrid search (§4.6).
pub const DEFAULT_RRF_K: u32 = 60;
/// Chunks per upsert batch (§4.6).
pub const DEFAULT_UPSERT_BATCH_SIZE: usize = 64;

/// Per-document segment failure rate above which the document (not the job) is aborted (§4.1).
pub const DEFAULT_DOCUMENT_FAILURE_RATE_THRESHOLD: f32 = 0.25;
/// Max retry attempts for idempotent operations (§4.1).
pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 5;
/// Backoff ceiling in seconds for retried operations (§4.1).
pub const DEFAULT_RETRY_BACKOFF_CEILING_SECS: u64 = 30;

/// Progress bus bounded buffer size before the slowest subscriber is dropped (§4.9).
pub const DEFAULT_PROGRESS_BUS_BUFFER: usize = 1024;

/// Minimum cosine similarity for fact-dedup merge candidates (§4.8).
pub const FACT_DEDUP_COSINE_THRESHOLD: f32 = 0.95;
/// Minimum normalized text-equality score for fact-dedup merge candidates (§4.8).
pub const FACT_DEDUP_TEXT_EQUALITY_THRESHOLD: f32 = 0.9;

/// Per-RPC timeouts in seconds (§5).
pub mod timeouts {
    pub const BOUNDARY_DETECTION_SECS: u64 = 120;
    pub const CLASSIFICATION_SECS: u64 = 30;
    pub const EMBEDDING_BATCH_SECS: u64 = 60;
    pub const UPSERT_BATCH_SECS: u64 = 30;
    pub const FACT_EXTRACTION_UNIT_SECS: u64 = 60;
    pub const ACCESS_ORACLE_SECS: u64 = 10;
}

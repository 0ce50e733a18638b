//! LLM classifier / fact-extractor client port (§6.3).
//!
//! A single external collaborator interface; the segment classifier and
//! fact extractor providers both depend on this rather than wiring an HTTP
//! client directly, so tests can swap in a stub.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Result of an LLM classification call.
#[derive(Debug, Clone)]
pub struct LlmClassification {
    /// Raw label returned by the model; the caller is responsible for
    /// clamping out-of-enum labels to `Other` (§4.3).
    pub label: String,
    pub confidence: f32,
}

/// Must be idempotent from the caller's view; retries are safe. Implementations
/// enforce their own timeouts and output-schema validation (§6.3).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Classify `text` against the closed set of `allowed_labels`, optionally aided by `hints`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Transient`] on timeout/rate-limit, escalated
    /// by the caller to [`crate::error::Error::BackendUnavailable`] after the retry budget.
    async fn classify(&self, text: &str, allowed_labels: &[String], hints: &[String]) -> Result<LlmClassification>;

    /// Extract facts matching the Fact schema (minus ids/timestamps) from `text`.
    /// Returns raw JSON values; schema validation happens in the caller (§4.8 step 3).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Transient`] on timeout/rate-limit.
    async fn extract_facts(&self, text: &str, schema_hint: &str) -> Result<Vec<Value>>;
}

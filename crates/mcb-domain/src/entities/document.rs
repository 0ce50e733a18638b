//! Document entity (§3).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::DocumentId;

/// A single ingested file, exclusively owned by its case.
///
/// Created on ingest, immutable thereafter except for `superseded_by`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub case_name: String,
    /// SHA-256 of the raw file bytes
    pub content_hash: String,
    pub file_name: String,
    pub size_bytes: u64,
    pub page_count: u32,
    pub mime_type: String,
    pub ingested_at: DateTime<Utc>,
    pub source_metadata: HashMap<String, String>,
    /// Set when a later ingest declares this document superseded; the
    /// original record is otherwise immutable.
    pub superseded_by: Option<DocumentId>,
}

impl Document {
    /// True for a zero-page document (§4.2 edge case: empty PDF).
    #[must_use]
    pub fn is_empty_document(&self) -> bool {
        self.page_count == 0
    }
}

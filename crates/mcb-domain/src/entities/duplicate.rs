//! Document registry / deduplication records (§3, §4.7).

use serde::{Deserialize, Serialize};

use crate::value_objects::DocumentId;

/// An additional location a duplicate's bytes were seen at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionalLocation {
    pub case_name: String,
    pub path: String,
}

/// Maps one content hash to its primary document within a case, plus every
/// additional location the same bytes were re-ingested at. Cross-case
/// deduplication is prohibited (§4.7): identical bytes in two cases are two
/// independent documents, so this record is always scoped to one case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateRecord {
    pub content_hash: String,
    pub primary_document_id: DocumentId,
    pub additional_locations: Vec<AdditionalLocation>,
}

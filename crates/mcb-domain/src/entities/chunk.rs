//! Chunk entity (§3, §4.4, §6.4).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::segment::DocumentType;
use crate::value_objects::{ChunkId, DenseVector, DocumentId, PageSpan, SegmentId, SparseVector};

/// A chunk of segment text together with its dense and sparse encodings.
///
/// Invariant: `ordinal` is dense per segment — the set of ordinals for a
/// segment's chunks is exactly `{0, ..., k-1}` (testable property 4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub case_name: String,
    pub document_id: DocumentId,
    pub segment_id: SegmentId,
    pub ordinal: u32,
    pub text: String,
    pub dense_vector: Option<DenseVector>,
    pub sparse_keywords: SparseVector,
    pub sparse_citations: SparseVector,
    pub token_count: u32,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Flatten into the scalar K→V map the vector store payload indexes expect
    /// (§4.6, §6.1, §6.4). Includes the chunk's own identity fields —
    /// `caseName`, `documentId`, `segmentId`, `ordinal` — alongside the
    /// verbatim metadata fields, since both the API response payload and the
    /// keyword-filter path in `search` key off these exact names.
    #[must_use]
    pub fn to_payload_map(&self) -> HashMap<String, serde_json::Value> {
        let mut map = self.metadata.to_payload_map();
        map.insert("caseName".to_owned(), serde_json::json!(self.case_name));
        map.insert("documentId".to_owned(), serde_json::json!(self.document_id.to_string()));
        map.insert("segmentId".to_owned(), serde_json::json!(self.segment_id.to_string()));
        map.insert("ordinal".to_owned(), serde_json::json!(self.ordinal));
        map
    }
}

/// Verbatim chunk-payload fields (§6.4) carried alongside the vectors so the
/// vector store adapter can index and filter on them without re-deriving
/// anything from `text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub document_type: DocumentType,
    pub page_span: PageSpan,
    pub bates_start: Option<String>,
    pub bates_end: Option<String>,
    pub production_batch: Option<String>,
    pub producing_party: Option<String>,
    pub has_citations: bool,
    pub citation_count: u32,
    pub has_monetary: bool,
    pub has_dates: bool,
}

impl ChunkMetadata {
    /// Flatten into the scalar K→V map the vector store payload indexes expect (§4.6, §6.4).
    #[must_use]
    pub fn to_payload_map(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert(
            "documentType".to_owned(),
            serde_json::Value::String(self.document_type.to_string()),
        );
        map.insert(
            "pageSpanStart".to_owned(),
            serde_json::json!(self.page_span.start),
        );
        map.insert(
            "pageSpanEnd".to_owned(),
            serde_json::json!(self.page_span.end),
        );
        if let Some(start) = &self.bates_start {
            map.insert("batesStart".to_owned(), serde_json::json!(start));
        }
        if let Some(end) = &self.bates_end {
            map.insert("batesEnd".to_owned(), serde_json::json!(end));
        }
        if let Some(batch) = &self.production_batch {
            map.insert("productionBatch".to_owned(), serde_json::json!(batch));
        }
        if let Some(party) = &self.producing_party {
            map.insert("producingParty".to_owned(), serde_json::json!(party));
        }
        map.insert("hasCitations".to_owned(), serde_json::json!(self.has_citations));
        map.insert("citationCount".to_owned(), serde_json::json!(self.citation_count));
        map.insert("hasMonetary".to_owned(), serde_json::json!(self.has_monetary));
        map.insert("hasDates".to_owned(), serde_json::json!(self.has_dates));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::PageSpan;

    #[test]
    fn payload_map_includes_required_keys() {
        let meta = ChunkMetadata {
            document_type: DocumentType::Email,
            page_span: PageSpan::new(0, 2),
            bates_start: Some("DEF000001".to_owned()),
            bates_end: Some("DEF000003".to_owned()),
            production_batch: Some("PROD1".to_owned()),
            producing_party: None,
            has_citations: true,
            citation_count: 2,
            has_monetary: false,
            has_dates: true,
        };
        let map = meta.to_payload_map();
        assert_eq!(map["documentType"], "Email");
        assert_eq!(map["pageSpanStart"], 0);
        assert_eq!(map["citationCount"], 2);
        assert!(!map.contains_key("producingParty"));
    }

    #[test]
    fn chunk_payload_map_includes_identity_fields() {
        let document_id = DocumentId::new();
        let segment_id = SegmentId::new();
        let chunk = Chunk {
            id: ChunkId::derive("case1", document_id, segment_id, 3),
            case_name: "case1".to_owned(),
            document_id,
            segment_id,
            ordinal: 3,
            text: "chunk text".to_owned(),
            dense_vector: None,
            sparse_keywords: SparseVector::default(),
            sparse_citations: SparseVector::default(),
            token_count: 10,
            metadata: ChunkMetadata {
                document_type: DocumentType::Email,
                page_span: PageSpan::new(0, 0),
                bates_start: None,
                bates_end: None,
                production_batch: None,
                producing_party: None,
                has_citations: false,
                citation_count: 0,
                has_monetary: false,
                has_dates: false,
            },
        };
        let map = chunk.to_payload_map();
        assert_eq!(map["caseName"], "case1");
        assert_eq!(map["documentId"], document_id.to_string());
        assert_eq!(map["segmentId"], segment_id.to_string());
        assert_eq!(map["ordinal"], 3);
    }
}

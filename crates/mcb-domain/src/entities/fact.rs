//! Fact entity and its edit/review lifecycle (§3, §4.8).

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ChunkId, DocumentId, FactId};

/// Category assigned to an extracted fact. Closed per §9's redesign flag
/// (exhaustive matching replaces ad hoc `isinstance` checks); `Other` is the
/// only open-ended value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactCategory {
    Injury,
    Treatment,
    Liability,
    Damages,
    Timeline,
    Witness,
    Communication,
    Financial,
    Compliance,
    Other,
}

/// A reference to a date mentioned in a fact's source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRef {
    /// Resolved calendar date, if the extractor could parse one
    pub date: Option<DateTime<Utc>>,
    /// Verbatim text the date was extracted from
    pub raw_text: String,
}

/// A bounding box on the source page, `[x1, y1, x2, y2]`.
pub type BoundingBox = [f32; 4];

/// One append-only entry in a fact's edit history (§3: "mutated only via
/// explicit edit/delete operations that append to editHistory").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactEditEntry {
    pub edited_at: DateTime<Utc>,
    pub user_id: String,
    pub reason: String,
    pub previous_content: String,
}

/// Human review status of a fact, independent of its edit history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReviewStatus {
    #[default]
    Unreviewed,
    Confirmed,
    Disputed,
}

/// A schema-validated statement extracted from one or more chunks, with
/// provenance and soft-delete/edit-history semantics (§3, §4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub id: FactId,
    pub case_name: String,
    pub document_id: DocumentId,
    pub chunk_ids: HashSet<ChunkId>,
    pub content: String,
    pub category: FactCategory,
    pub entities: HashMap<String, Vec<String>>,
    pub date_references: Vec<DateRef>,
    /// 0..1
    pub confidence: f32,
    pub source_snippet: String,
    pub page: u32,
    pub bbox: Option<BoundingBox>,
    pub is_edited: bool,
    /// Soft-delete flag; the vector is left in place and filtered on read (§4.8).
    pub is_deleted: bool,
    pub edit_history: Vec<FactEditEntry>,
    pub review_status: ReviewStatus,
}

impl Fact {
    /// Apply an edit: append to history, replace content, mark edited.
    /// Re-embedding is the caller's responsibility (it needs the dense encoder port).
    pub fn apply_edit(&mut self, new_content: String, user_id: String, reason: String) {
        self.edit_history.push(FactEditEntry {
            edited_at: Utc::now(),
            user_id,
            reason,
            previous_content: std::mem::replace(&mut self.content, new_content),
        });
        self.is_edited = true;
    }

    /// Soft-delete this fact; the vector remains in the store and is filtered on read.
    pub fn apply_delete(&mut self, user_id: String, reason: String) {
        self.edit_history.push(FactEditEntry {
            edited_at: Utc::now(),
            user_id,
            reason,
            previous_content: self.content.clone(),
        });
        self.is_deleted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fact() -> Fact {
        Fact {
            id: FactId::new(),
            case_name: "case1".to_owned(),
            document_id: DocumentId::new(),
            chunk_ids: HashSet::new(),
            content: "original content".to_owned(),
            category: FactCategory::Injury,
            entities: HashMap::new(),
            date_references: Vec::new(),
            confidence: 0.9,
            source_snippet: "snippet".to_owned(),
            page: 1,
            bbox: None,
            is_edited: false,
            is_deleted: false,
            edit_history: Vec::new(),
            review_status: ReviewStatus::Unreviewed,
        }
    }

    #[test]
    fn apply_edit_appends_history_and_marks_edited() {
        let mut fact = sample_fact();
        fact.apply_edit("new content".to_owned(), "user1".to_owned(), "correction".to_owned());
        assert!(fact.is_edited);
        assert_eq!(fact.content, "new content");
        assert_eq!(fact.edit_history.len(), 1);
        assert_eq!(fact.edit_history[0].previous_content, "original content");
    }

    #[test]
    fn apply_delete_sets_flag_and_preserves_vector_eligibility() {
        let mut fact = sample_fact();
        fact.apply_delete("user1".to_owned(), "irrelevant".to_owned());
        assert!(fact.is_deleted);
        assert!(!fact.content.is_empty());
    }
}

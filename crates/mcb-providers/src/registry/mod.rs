//! In-process, case-keyed-mutex document registry (§4.7, §5).

use async_trait::async_trait;
use dashmap::DashMap;
use mcb_domain::entities::{AdditionalLocation, Document, DuplicateRecord};
use mcb_domain::error::Result;
use mcb_domain::ports::{DocumentRegistry, RegisterOutcome};
use mcb_domain::value_objects::CaseName;
use std::sync::Arc;
use tokio::sync::Mutex;

type CaseHashTable = Mutex<std::collections::HashMap<String, DuplicateRecord>>;

/// Deduplicates by content hash within a case. Cross-case bytes are never compared.
#[derive(Default)]
pub struct InMemoryDocumentRegistry {
    cases: DashMap<String, Arc<CaseHashTable>>,
}

impl InMemoryDocumentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn table_for(&self, case: &CaseName) -> Arc<CaseHashTable> {
        Arc::clone(
            self.cases
                .entry(case.as_str().to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(std::collections::HashMap::new())))
                .value(),
        )
    }
}

#[async_trait]
impl DocumentRegistry for InMemoryDocumentRegistry {
    async fn register(&self, case: &CaseName, document: &Document) -> Result<RegisterOutcome> {
        let table = self.table_for(case);
        let mut guard = table.lock().await;
        match guard.get_mut(&document.content_hash) {
            None => {
                guard.insert(
                    document.content_hash.clone(),
                    DuplicateRecord {
                        content_hash: document.content_hash.clone(),
                        primary_document_id: document.id,
                        additional_locations: Vec::new(),
                    },
                );
                Ok(RegisterOutcome::Primary)
            }
            Some(record) => {
                record.additional_locations.push(AdditionalLocation {
                    case_name: document.case_name.clone(),
                    path: document.file_name.clone(),
                });
                Ok(RegisterOutcome::Duplicate(record.clone()))
            }
        }
    }
}

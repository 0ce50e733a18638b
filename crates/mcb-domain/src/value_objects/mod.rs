//! Immutable value objects used across entities and ports.

mod case_name;
mod ids;
mod page;
mod vectors;

pub use case_name::{AuxiliaryCollection, CaseName};
pub use ids::{ChunkId, DocumentId, FactId, ProcessingId, SegmentId};
pub use page::{BatesRange, PageFeatures, PageSpan};
pub use vectors::{DenseVector, SparseVector, SPARSE_VECTOR_CAP};

//! Core business entities with identity (§3).

mod chunk;
mod document;
mod duplicate;
mod fact;
mod job;
mod segment;
mod shared_collection;

pub use chunk::{Chunk, ChunkMetadata};
pub use document::Document;
pub use duplicate::{AdditionalLocation, DuplicateRecord};
pub use fact::{BoundingBox, DateRef, Fact, FactCategory, FactEditEntry, ReviewStatus};
pub use job::{JobErrorEntry, JobState, JobTotals, ProcessingJob};
pub use segment::{DocumentType, Segment};
pub use shared_collection::SharedCollection;

//! Port traits: the seams through which the application layer reaches
//! external collaborators. Nothing in this module touches I/O directly.

mod access_oracle;
mod boundary_detector;
mod chunker;
mod dense_encoder;
mod document_registry;
mod fact_extractor;
mod file_source;
mod llm_client;
mod orchestrator;
mod pdf_feature_provider;
mod progress_bus;
mod segment_classifier;
mod sparse_encoder;
mod text_extractor;
mod tokenizer;
mod vector_store;

pub use access_oracle::{AccessOracle, Permission};
pub use boundary_detector::BoundaryDetector;
pub use chunker::{ChunkDraft, Chunker};
pub use dense_encoder::DenseEncoder;
pub use document_registry::{DocumentRegistry, RegisterOutcome};
pub use fact_extractor::FactExtractor;
pub use file_source::{FileSource, InputFile};
pub use llm_client::{LlmClassification, LlmClient};
pub use orchestrator::{JobRequest, Orchestrator};
pub use pdf_feature_provider::PdfFeatureProvider;
pub use progress_bus::{ProgressBus, ProgressStream};
pub use segment_classifier::{ClassificationOutcome, SegmentClassifier};
pub use sparse_encoder::{CitationEncoder, CitationEncoding, CitationFlags, KeywordEncoder};
pub use text_extractor::{ExtractedText, PageOffset, TextExtractor};
pub use tokenizer::Tokenizer;
pub use vector_store::{Hit, SearchQuery, SearchWeights, VectorStoreAdapter};

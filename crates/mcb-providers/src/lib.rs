//! Concrete port adapters for the discovery processing engine.
//!
//! Each submodule implements one `mcb_domain::ports` trait. None of these
//! types know about each other; they are wired together by `mcb-infrastructure::Services`.

pub mod access;
pub mod chunking;
pub mod classification;
pub mod encoding;
pub mod facts;
pub mod file_sources;
pub mod llm;
pub mod pdf;
pub mod registry;
pub mod segmentation;
pub mod vector_store;

pub use access::{AllowAllAccessOracle, HttpAccessOracle};
pub use chunking::{NaiveTokenizer, ParagraphChunker, PlainTextExtractor};
pub use classification::RuleBasedSegmentClassifier;
pub use encoding::{HttpDenseEncoder, RegexCitationEncoder, StopwordKeywordEncoder};
pub use facts::HttpFactExtractor;
pub use file_sources::{CompositeFileSource, InlineFileSource, RemoteFolderFileSource};
pub use llm::HttpLlmClient;
pub use pdf::PdfExtractFeatureProvider;
pub use registry::InMemoryDocumentRegistry;
pub use segmentation::RuleBasedBoundaryDetector;
pub use vector_store::InProcessVectorStore;

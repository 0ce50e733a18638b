//! # Application Layer
//!
//! Use-case services that compose `mcb-domain` ports into the behaviors
//! described in §4 of the design: the job orchestrator, the fact-extraction
//! gate, and the read-only hybrid-search/timeline projection. No concrete
//! provider knows about another provider here; everything is wired through
//! `Arc<dyn Port>` fields assembled by `mcb-infrastructure::Services`.

pub mod constants;
pub mod retry;
pub mod use_cases;

pub use use_cases::fact_extraction_service::FactExtractionService;
pub use use_cases::hybrid_search_service::{HybridSearchService, TimelineEntry};
pub use use_cases::orchestrator_service::OrchestratorImpl;

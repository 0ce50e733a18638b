//! Explicit process-wide wiring (§9 redesign flag).
//!
//! The reference codebase resolves collaborators through a DI container and
//! a handful of process singletons. Here there is exactly one `Services`
//! value per process: built once at startup from a `Config` and a set of
//! concrete port implementations, then handed to the server as an
//! `Arc<Services>`. No global statics, no service locator, no hidden
//! resolution order.

use std::sync::Arc;

use mcb_application::{FactExtractionService, HybridSearchService, OrchestratorImpl};
use mcb_domain::ports::{
    AccessOracle, BoundaryDetector, CitationEncoder, Chunker, DenseEncoder, DocumentRegistry, FactExtractor,
    FileSource, KeywordEncoder, PdfFeatureProvider, ProgressBus, SegmentClassifier, TextExtractor, VectorStoreAdapter,
};

use crate::config::Config;
use crate::lifecycle::{AggregateHealth, LifecycleManaged};

/// Every concrete port adapter the process needs, handed in from the binary
/// after it builds them from `Config` (§9: construction is the binary's job,
/// not this struct's).
#[allow(clippy::too_many_arguments)]
pub struct ServiceDependencies {
    pub access_oracle: Arc<dyn AccessOracle>,
    pub file_source: Arc<dyn FileSource>,
    pub pdf_features: Arc<dyn PdfFeatureProvider>,
    pub boundary_detector: Arc<dyn BoundaryDetector>,
    pub classifier: Arc<dyn SegmentClassifier>,
    pub text_extractor: Arc<dyn TextExtractor>,
    pub chunker: Arc<dyn Chunker>,
    pub dense_encoder: Arc<dyn DenseEncoder>,
    pub keyword_encoder: Arc<dyn KeywordEncoder>,
    pub citation_encoder: Arc<dyn CitationEncoder>,
    pub vector_store: Arc<dyn VectorStoreAdapter>,
    pub document_registry: Arc<dyn DocumentRegistry>,
    pub fact_extractor: Arc<dyn FactExtractor>,
    pub progress_bus: Arc<dyn ProgressBus>,
    pub lifecycle_managed: Vec<Arc<dyn LifecycleManaged>>,
}

/// The single process-wide wiring value (§9). Cheap to clone; every field is
/// either an `Arc` or a `Config` that is itself only read after startup.
#[derive(Clone)]
pub struct Services {
    pub config: Config,
    pub orchestrator: Arc<OrchestratorImpl>,
    pub hybrid_search: Arc<HybridSearchService>,
    pub fact_extraction: Arc<FactExtractionService>,
    pub progress_bus: Arc<dyn ProgressBus>,
    lifecycle_managed: Arc<Vec<Arc<dyn LifecycleManaged>>>,
}

impl Services {
    /// Assemble the process-wide services from a validated `Config` and the
    /// concrete port implementations the binary constructed.
    #[must_use]
    pub fn new(config: Config, deps: ServiceDependencies) -> Self {
        let orchestrator = Arc::new(OrchestratorImpl::new(
            deps.access_oracle,
            deps.file_source,
            deps.pdf_features,
            deps.boundary_detector,
            deps.classifier,
            deps.text_extractor,
            deps.chunker,
            Arc::clone(&deps.dense_encoder),
            Arc::clone(&deps.keyword_encoder),
            Arc::clone(&deps.citation_encoder),
            Arc::clone(&deps.vector_store),
            deps.document_registry,
            Arc::clone(&deps.fact_extractor),
            Arc::clone(&deps.progress_bus),
            config.file_concurrency,
            config.segment_concurrency,
        ));

        let hybrid_search = Arc::new(HybridSearchService::new(
            deps.vector_store,
            deps.dense_encoder,
            deps.keyword_encoder,
            deps.citation_encoder,
        ));

        let fact_extraction = Arc::new(FactExtractionService::new(deps.fact_extractor));

        Self {
            config,
            orchestrator,
            hybrid_search,
            fact_extraction,
            progress_bus: deps.progress_bus,
            lifecycle_managed: Arc::new(deps.lifecycle_managed),
        }
    }

    /// Probe every registered dependency and return the aggregate health
    /// report for the server's `/health` endpoint.
    pub async fn health(&self) -> AggregateHealth {
        let mut snapshots = Vec::with_capacity(self.lifecycle_managed.len());
        for dependency in self.lifecycle_managed.iter() {
            snapshots.push(dependency.health_check().await);
        }
        AggregateHealth::from_snapshots(snapshots)
    }
}

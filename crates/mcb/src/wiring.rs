//! Builds `Services` from a validated `Config` by instantiating every
//! concrete `mcb-providers` adapter (§9: construction is the binary's job).

use std::sync::Arc;
use std::time::Duration;

use mcb_domain::ports::{AccessOracle, DenseEncoder, LlmClient};
use mcb_infrastructure::config::Config;
use mcb_infrastructure::lifecycle::LifecycleManaged;
use mcb_infrastructure::services::ServiceDependencies;
use mcb_infrastructure::{InProcessProgressBus, Services};
use mcb_providers::{
    AllowAllAccessOracle, CompositeFileSource, HttpAccessOracle, HttpDenseEncoder, HttpFactExtractor, HttpLlmClient,
    InMemoryDocumentRegistry, InProcessVectorStore, NaiveTokenizer, ParagraphChunker, PdfExtractFeatureProvider, PlainTextExtractor,
    RegexCitationEncoder, RuleBasedBoundaryDetector, RuleBasedSegmentClassifier, StopwordKeywordEncoder,
};

/// Assemble `Services` from a validated config, wiring every port to its
/// HTTP-backed or in-process adapter.
#[must_use]
pub fn build_services(config: Config) -> Services {
    let llm: Arc<dyn LlmClient> = Arc::new(HttpLlmClient::new(
        config.endpoints.llm_url.clone(),
        Duration::from_secs(config.timeouts.classification_secs),
    ));

    let dense_encoder: Arc<dyn DenseEncoder> = Arc::new(HttpDenseEncoder::new(
        config.endpoints.embedding_url.clone(),
        config.endpoints.dense_dimensions,
    ));

    let access_oracle: Arc<dyn AccessOracle> = match &config.endpoints.access_oracle_url {
        Some(url) => Arc::new(HttpAccessOracle::new(url.clone(), Duration::from_secs(config.timeouts.access_oracle_secs))),
        None => Arc::new(AllowAllAccessOracle),
    };

    let vector_store = Arc::new(InProcessVectorStore::new(Arc::clone(&dense_encoder)));
    let keyword_encoder = Arc::new(StopwordKeywordEncoder);
    let citation_encoder = Arc::new(RegexCitationEncoder);

    let fact_extractor = Arc::new(HttpFactExtractor::new(Arc::clone(&llm), Arc::clone(&dense_encoder), vector_store.clone()));

    let progress_bus = Arc::new(InProcessProgressBus::new(config.progress_bus_buffer));

    let lifecycle_managed: Vec<Arc<dyn LifecycleManaged>> = Vec::new();

    let deps = ServiceDependencies {
        access_oracle,
        file_source: Arc::new(CompositeFileSource::new()),
        pdf_features: Arc::new(PdfExtractFeatureProvider),
        boundary_detector: Arc::new(RuleBasedBoundaryDetector::new(config.soft_boundary_threshold, config.ocr_threshold_relaxation)),
        classifier: Arc::new(RuleBasedSegmentClassifier::new(Arc::clone(&llm))),
        text_extractor: Arc::new(PlainTextExtractor),
        chunker: Arc::new(ParagraphChunker::new(Arc::new(NaiveTokenizer))),
        dense_encoder: Arc::clone(&dense_encoder),
        keyword_encoder,
        citation_encoder,
        vector_store,
        document_registry: Arc::new(InMemoryDocumentRegistry::new()),
        fact_extractor,
        progress_bus,
        lifecycle_managed,
    };

    Services::new(config, deps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_services_from_default_config() {
        let services = build_services(Config::default());
        assert_eq!(services.config.endpoints.dense_dimensions, 1536);
    }
}

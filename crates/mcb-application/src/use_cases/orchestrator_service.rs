//! Orchestrator use case (§4.1).
//!
//! # Overview
//! Drives one `ProcessingJob` from `Submit` to a terminal state, coordinating
//! every other port: boundary detection, classification, extraction,
//! chunking, encoding, vector storage, fact extraction and progress
//! publication. Bounded concurrency at the file and segment level keeps
//! memory and downstream load predictable regardless of production size.
//!
//! # Architecture
//! `OrchestratorImpl` holds an `Arc<dyn Port>` for every collaborator plus a
//! job table for `Status` snapshots, mirroring the reference codebase's
//! background-indexing-task pattern: `Submit` spawns the work and returns the
//! job id immediately. `OrchestratorImpl` is cheap to clone (every field is
//! an `Arc`), so the background task just clones `self` the way
//! `IndexingServiceImpl` does.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use mcb_domain::entities::{Chunk, ChunkMetadata, Document, JobErrorEntry, JobState, ProcessingJob, Segment};
use mcb_domain::error::{Error, Result};
use mcb_domain::events::ProgressEvent;
use mcb_domain::ports::{
    AccessOracle, BoundaryDetector, CitationEncoder, Chunker, DenseEncoder, DocumentRegistry,
    FactExtractor, FileSource, JobRequest, KeywordEncoder, Orchestrator, PdfFeatureProvider,
    Permission, ProgressBus, RegisterOutcome, SegmentClassifier, TextExtractor, VectorStoreAdapter,
};
use mcb_domain::value_objects::{CaseName, ChunkId, ProcessingId};
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::constants::{DOCUMENT_FAILURE_RATE_THRESHOLD, PROGRESS_UPDATE_INTERVAL};
use crate::retry::with_retry;

const CLASSIFIER_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Constructor-wired collaborator set for one orchestrator instance. Each
/// field is a small interface over a single collaborator (§9): no dynamic
/// wiring, no decorator-based injection, just explicit `Arc<dyn Port>`.
#[derive(Clone)]
pub struct OrchestratorImpl {
    access_oracle: Arc<dyn AccessOracle>,
    file_source: Arc<dyn FileSource>,
    pdf_features: Arc<dyn PdfFeatureProvider>,
    boundary_detector: Arc<dyn BoundaryDetector>,
    classifier: Arc<dyn SegmentClassifier>,
    text_extractor: Arc<dyn TextExtractor>,
    chunker: Arc<dyn Chunker>,
    dense_encoder: Arc<dyn DenseEncoder>,
    keyword_encoder: Arc<dyn KeywordEncoder>,
    citation_encoder: Arc<dyn CitationEncoder>,
    vector_store: Arc<dyn VectorStoreAdapter>,
    document_registry: Arc<dyn DocumentRegistry>,
    fact_extractor: Arc<dyn FactExtractor>,
    progress_bus: Arc<dyn ProgressBus>,
    jobs: Arc<DashMap<ProcessingId, ProcessingJob>>,
    cancellation: Arc<DashMap<ProcessingId, CancellationToken>>,
    file_concurrency: usize,
    segment_concurrency: usize,
}

impl OrchestratorImpl {
    /// Create a new orchestrator with injected collaborators and the
    /// configured per-job concurrency knobs (§5: N files, M segments).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        access_oracle: Arc<dyn AccessOracle>,
        file_source: Arc<dyn FileSource>,
        pdf_features: Arc<dyn PdfFeatureProvider>,
        boundary_detector: Arc<dyn BoundaryDetector>,
        classifier: Arc<dyn SegmentClassifier>,
        text_extractor: Arc<dyn TextExtractor>,
        chunker: Arc<dyn Chunker>,
        dense_encoder: Arc<dyn DenseEncoder>,
        keyword_encoder: Arc<dyn KeywordEncoder>,
        citation_encoder: Arc<dyn CitationEncoder>,
        vector_store: Arc<dyn VectorStoreAdapter>,
        document_registry: Arc<dyn DocumentRegistry>,
        fact_extractor: Arc<dyn FactExtractor>,
        progress_bus: Arc<dyn ProgressBus>,
        file_concurrency: usize,
        segment_concurrency: usize,
    ) -> Self {
        Self {
            access_oracle,
            file_source,
            pdf_features,
            boundary_detector,
            classifier,
            text_extractor,
            chunker,
            dense_encoder,
            keyword_encoder,
            citation_encoder,
            vector_store,
            document_registry,
            fact_extractor,
            progress_bus,
            jobs: Arc::new(DashMap::new()),
            cancellation: Arc::new(DashMap::new()),
            file_concurrency,
            segment_concurrency,
        }
    }

    fn content_hash(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    fn update_job(&self, id: ProcessingId, f: impl FnOnce(&mut ProcessingJob)) {
        if let Some(mut entry) = self.jobs.get_mut(&id) {
            f(entry.value_mut());
        }
    }

    async fn publish(&self, case: &CaseName, id: ProcessingId, event: ProgressEvent) {
        if let Err(e) = self.progress_bus.publish(case, id, event).await {
            warn!(job = %id, error = %e, "failed to publish progress event");
        }
    }

    async fn fail_job(&self, case: &CaseName, id: ProcessingId, stage: &str, message: &str) {
        self.update_job(id, |job| job.finish(JobState::Failed));
        self.publish(
            case,
            id,
            ProgressEvent::JobFailed {
                stage: stage.to_owned(),
                error: message.to_owned(),
                document_id: None,
            },
        )
        .await;
    }

    /// The job's full lifecycle (§4.1 algorithm).
    async fn run_job(self, id: ProcessingId, request: JobRequest) {
        let token = self
            .cancellation
            .get(&id)
            .map(|e| e.value().clone())
            .unwrap_or_default();

        self.update_job(id, |job| job.state = JobState::Running);

        let files = match self.file_source.get(&request.input_reference).await {
            Ok(files) => files,
            Err(e) => {
                self.fail_job(&request.case_name, id, "file_source", &e.to_string()).await;
                return;
            }
        };

        self.publish(
            &request.case_name,
            id,
            ProgressEvent::JobStarted {
                total_files: files.len() as u32,
            },
        )
        .await;
        self.update_job(id, |job| job.totals.files_found = files.len() as u32);

        let semaphore = Arc::new(Semaphore::new(self.file_concurrency.max(1)));
        let mut handles = Vec::with_capacity(files.len());
        for file in files {
            if token.is_cancelled() {
                break;
            }
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore not closed");
            let this = self.clone();
            let case = request.case_name.clone();
            let request = request.clone();
            let token = token.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                this.process_file(&case, id, file.name, file.bytes, &token, &request).await
            }));
        }

        let mut infra_failure: Option<Error> = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e @ Error::BackendUnavailable { .. })) => {
                    infra_failure = Some(e);
                }
                Ok(Err(e)) => {
                    warn!(job = %id, error = %e, "document processing failed, continuing job");
                }
                Err(join_err) => {
                    error!(job = %id, error = %join_err, "file-processing task panicked");
                }
            }
        }

        if token.is_cancelled() {
            self.update_job(id, |job| job.finish(JobState::Cancelled));
            self.publish(
                &request.case_name,
                id,
                ProgressEvent::JobCancelled {
                    reason: "cancellation requested".to_owned(),
                },
            )
            .await;
            return;
        }

        if let Some(e) = infra_failure {
            self.fail_job(&request.case_name, id, "vector_store", &e.to_string()).await;
            return;
        }

        let totals = self.jobs.get(&id).map(|j| j.totals).unwrap_or_default();
        self.update_job(id, |job| job.finish(JobState::Completed));
        info!(job = %id, ?totals, "job completed");
        self.publish(
            &request.case_name,
            id,
            ProgressEvent::JobCompleted {
                totals,
                elapsed_seconds: 0.0,
            },
        )
        .await;
    }

    /// Ingest one file: dedup, register, detect boundaries, process segments (§4.1 step 3).
    async fn process_file(
        &self,
        case: &CaseName,
        job_id: ProcessingId,
        file_name: String,
        bytes: Vec<u8>,
        token: &CancellationToken,
        request: &JobRequest,
    ) -> Result<()> {
        let content_hash = Self::content_hash(&bytes);
        let pages = self.pdf_features.pages(&bytes)?;

        let document = Document {
            id: mcb_domain::value_objects::DocumentId::new(),
            case_name: case.as_str().to_owned(),
            content_hash: content_hash.clone(),
            file_name,
            size_bytes: bytes.len() as u64,
            page_count: pages.len() as u32,
            mime_type: "application/pdf".to_owned(),
            ingested_at: Utc::now(),
            source_metadata: request.production_metadata.clone(),
            superseded_by: None,
        };

        match self.document_registry.register(case, &document).await? {
            RegisterOutcome::Duplicate(dup) => {
                self.publish(
                    case,
                    job_id,
                    ProgressEvent::DocumentDuplicate {
                        document_id: document.id.to_string(),
                        original_id: dup.primary_document_id.to_string(),
                    },
                )
                .await;
                return Ok(());
            }
            RegisterOutcome::Primary => {}
        }

        let segments = self
            .boundary_detector
            .detect(case.as_str(), document.id, &pages)
            .await?;

        self.update_job(job_id, |job| job.totals.docs_processed += 1);
        self.publish(
            case,
            job_id,
            ProgressEvent::DocumentFound {
                document_id: document.id.to_string(),
                title: None,
                document_type: segments
                    .first()
                    .map(|s| s.document_type)
                    .unwrap_or(mcb_domain::entities::DocumentType::Unknown),
                page_count: document.page_count,
                bates_range: segments.first().and_then(|s| s.bates_range.clone()),
                confidence: segments.first().map(|s| s.confidence).unwrap_or(0.0),
            },
        )
        .await;

        let semaphore = Arc::new(Semaphore::new(self.segment_concurrency.max(1)));
        let total_segments = segments.len();
        let mut handles = Vec::with_capacity(total_segments);
        for (idx, segment) in segments.into_iter().enumerate() {
            if token.is_cancelled() {
                break;
            }
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore not closed");
            let this = self.clone();
            let case = case.clone();
            let request = request.clone();
            let bytes = bytes.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                this.process_segment(&case, job_id, segment, idx, &bytes, &request).await
            }));
        }

        let mut failures = 0usize;
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    self.update_job(job_id, |job| {
                        job.record_error(JobErrorEntry {
                            document_id: Some(document.id.to_string()),
                            segment_id: None,
                            stage: "segment_pipeline".to_owned(),
                            message: e.to_string(),
                            occurred_at: Utc::now(),
                        });
                    });
                }
                Err(join_err) => {
                    failures += 1;
                    error!(job = %job_id, error = %join_err, "segment task panicked");
                }
            }
        }

        if total_segments > 0 && (failures as f32 / total_segments as f32) > DOCUMENT_FAILURE_RATE_THRESHOLD {
            return Err(Error::component_failure(
                "segment_pipeline",
                format!("{failures}/{total_segments} segments failed, aborting document"),
            ));
        }

        Ok(())
    }

    /// Per-segment pipeline: extract, classify, chunk, encode, upsert, extract facts (§4.1 step 3d).
    async fn process_segment(
        &self,
        case: &CaseName,
        job_id: ProcessingId,
        mut segment: Segment,
        idx: usize,
        pdf_bytes: &[u8],
        request: &JobRequest,
    ) -> Result<()> {
        let extracted = self.text_extractor.extract(pdf_bytes, segment.page_span).await?;
        segment.needs_ocr = segment.needs_ocr || extracted.needs_ocr;

        if segment.confidence < CLASSIFIER_CONFIDENCE_THRESHOLD {
            let outcome = self
                .classifier
                .classify(&extracted.text, &segment.boundary_indicators)
                .await?;
            segment.document_type = outcome.document_type;
            segment.confidence = outcome.confidence;
            if let Some(title) = outcome.title {
                segment.title = Some(title);
            }
        }

        let drafts = self.chunker.chunk(&extracted)?;

        if idx % PROGRESS_UPDATE_INTERVAL == 0 {
            self.publish(
                case,
                job_id,
                ProgressEvent::SegmentChunking {
                    document_id: segment.document_id.to_string(),
                    segment_id: segment.id.to_string(),
                    chunks_created: drafts.len() as u32,
                    progress_percent: 100.0,
                },
            )
            .await;
        }

        let texts: Vec<String> = drafts.iter().map(|d| d.text.clone()).collect();
        let dense_vectors = with_retry("dense_encoder.embed_batch", || {
            let texts = texts.clone();
            async move { self.dense_encoder.embed_batch(&texts).await }
        })
        .await?;

        self.publish(
            case,
            job_id,
            ProgressEvent::SegmentEmbedding {
                document_id: segment.document_id.to_string(),
                segment_id: segment.id.to_string(),
                progress_percent: 100.0,
            },
        )
        .await;

        let chunks: Vec<Chunk> = drafts
            .into_iter()
            .zip(dense_vectors.into_iter())
            .map(|(draft, dense)| {
                let id = ChunkId::derive(case.as_str(), segment.document_id, segment.id, draft.ordinal);
                let citation = self.citation_encoder.encode(&draft.text);
                let keywords = self.keyword_encoder.encode(&draft.text);
                Chunk {
                    id,
                    case_name: case.as_str().to_owned(),
                    document_id: segment.document_id,
                    segment_id: segment.id,
                    ordinal: draft.ordinal,
                    text: draft.text,
                    dense_vector: Some(dense),
                    sparse_keywords: keywords,
                    sparse_citations: citation.sparse,
                    token_count: draft.token_count,
                    metadata: ChunkMetadata {
                        document_type: segment.document_type,
                        page_span: draft.page_span,
                        bates_start: segment.bates_range.as_ref().map(|b| b.start.clone()),
                        bates_end: segment.bates_range.as_ref().map(|b| b.end.clone()),
                        production_batch: request.production_metadata.get("productionBatch").cloned(),
                        producing_party: request.production_metadata.get("producingParty").cloned(),
                        has_citations: citation.flags.has_citations,
                        citation_count: citation.flags.citation_count,
                        has_monetary: citation.flags.has_monetary,
                        has_dates: citation.flags.has_dates,
                    },
                }
            })
            .collect();

        with_retry("vector_store.upsert_chunks", || {
            let chunks = chunks.clone();
            async move { self.vector_store.upsert_chunks(case, &chunks).await }
        })
        .await?;

        self.update_job(job_id, |job| job.totals.chunks_stored += chunks.len() as u32);
        self.publish(
            case,
            job_id,
            ProgressEvent::SegmentStored {
                document_id: segment.document_id.to_string(),
                segment_id: segment.id.to_string(),
                vectors_stored: chunks.len() as u32,
            },
        )
        .await;

        if request.enable_fact_extraction && segment.document_type.fact_extraction_allowed() {
            match self.fact_extractor.extract(case, &segment, &chunks).await {
                Ok(facts) => {
                    self.update_job(job_id, |job| job.totals.facts_extracted += facts.len() as u32);
                    for fact in &facts {
                        self.publish(
                            case,
                            job_id,
                            ProgressEvent::FactExtracted {
                                document_id: segment.document_id.to_string(),
                                fact_id: fact.id.to_string(),
                                category: fact.category,
                                confidence: fact.confidence,
                            },
                        )
                        .await;
                    }
                }
                Err(e) => {
                    warn!(job = %job_id, segment = %segment.id, error = %e, "fact extraction failed for segment");
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Orchestrator for OrchestratorImpl {
    async fn submit(&self, request: JobRequest) -> Result<ProcessingId> {
        let allowed = self
            .access_oracle
            .can_access(&request.case_name, &request.user_id, Permission::Write)
            .await?;
        if !allowed {
            return Err(Error::access_denied(format!(
                "user '{}' lacks write access to case '{}'",
                request.user_id,
                request.case_name.as_str()
            )));
        }

        self.vector_store.ensure_collections(&request.case_name).await?;

        let job = ProcessingJob::queued(request.case_name.as_str().to_owned());
        let id = job.id;
        self.jobs.insert(id, job);
        self.cancellation.insert(id, CancellationToken::new());

        let runner = self.clone();
        tokio::spawn(async move {
            runner.run_job(id, request).await;
        });

        Ok(id)
    }

    async fn status(&self, id: ProcessingId) -> Result<ProcessingJob> {
        self.jobs
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::not_found(format!("processing job {id}")))
    }

    async fn cancel(&self, id: ProcessingId) -> Result<()> {
        let token = self
            .cancellation
            .get(&id)
            .ok_or_else(|| Error::not_found(format!("processing job {id}")))?;
        token.cancel();
        Ok(())
    }
}

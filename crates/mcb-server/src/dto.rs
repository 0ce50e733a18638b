//! Request/response bodies for the ingest RPC and progress channel (§6.1, §6.2).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mcb_domain::entities::{JobErrorEntry, JobState, ProcessingJob};
use mcb_domain::value_objects::ProcessingId;
use serde::{Deserialize, Serialize};

/// One file in the `files` variant of a `Submit` request.
#[derive(Debug, Deserialize)]
pub struct InlineFileDto {
    pub name: String,
    #[serde(rename = "contentBase64")]
    pub content_base64: String,
}

/// Body of `POST /discovery/process` (§6.1).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub case_name: String,
    #[serde(default)]
    pub files: Option<Vec<InlineFileDto>>,
    #[serde(default)]
    pub remote_folder_ref: Option<String>,
    #[serde(default)]
    pub production_metadata: HashMap<String, String>,
    #[serde(default)]
    pub enable_fact_extraction: bool,
    #[serde(default)]
    pub enable_deficiency_analysis: bool,
    #[serde(default)]
    pub rtp_document_id: Option<String>,
    #[serde(default)]
    pub oc_response_document_id: Option<String>,
}

/// Response of `POST /discovery/process`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub processing_id: ProcessingId,
    pub websocket_topic: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobErrorDto {
    pub document_id: Option<String>,
    pub segment_id: Option<String>,
    pub stage: String,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

impl From<&JobErrorEntry> for JobErrorDto {
    fn from(entry: &JobErrorEntry) -> Self {
        Self {
            document_id: entry.document_id.clone(),
            segment_id: entry.segment_id.clone(),
            stage: entry.stage.clone(),
            message: entry.message.clone(),
            occurred_at: entry.occurred_at,
        }
    }
}

/// Response of `GET /discovery/status/{processingId}`: the job snapshot (§6.1).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub processing_id: ProcessingId,
    pub case_name: String,
    pub state: JobState,
    pub files_found: u32,
    pub docs_processed: u32,
    pub chunks_stored: u32,
    pub facts_extracted: u32,
    pub errors: Vec<JobErrorDto>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl From<ProcessingJob> for StatusResponse {
    fn from(job: ProcessingJob) -> Self {
        Self {
            processing_id: job.id,
            case_name: job.case_name,
            state: job.state,
            files_found: job.totals.files_found,
            docs_processed: job.totals.docs_processed,
            chunks_stored: job.totals.chunks_stored,
            facts_extracted: job.totals.facts_extracted,
            errors: job.errors.iter().map(JobErrorDto::from).collect(),
            started_at: job.started_at,
            completed_at: job.completed_at,
            last_error: job.last_error,
        }
    }
}

/// Query parameters for `HybridSearchService::search` exposed over HTTP.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

fn default_top_k() -> usize {
    10
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HitDto {
    pub chunk_id: String,
    pub score: f32,
    pub payload: HashMap<String, serde_json::Value>,
}

impl From<mcb_domain::ports::Hit> for HitDto {
    fn from(hit: mcb_domain::ports::Hit) -> Self {
        Self {
            chunk_id: hit.chunk_id.to_string(),
            score: hit.score,
            payload: hit.payload,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub hits: Vec<HitDto>,
}

/// Body of the fact edit endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditFactRequest {
    pub content: String,
    pub user_id: String,
    pub reason: String,
}

/// Body of the fact delete endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFactRequest {
    pub user_id: String,
    pub reason: String,
}

//! Axum routes for the ingest RPC and progress channel (§6.1, §6.2).

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::StreamExt;
use mcb_domain::events::ProgressFrame;
use mcb_domain::ports::{Orchestrator, ProgressBus, SearchWeights};
use mcb_domain::value_objects::{CaseName, ProcessingId};
use mcb_infrastructure::Services;
use tower_http::trace::TraceLayer;

use crate::dto::{
    DeleteFactRequest, EditFactRequest, HitDto, InlineFileDto, ProcessRequest, ProcessResponse, SearchRequest,
    SearchResponse, StatusResponse,
};
use crate::error::ApiError;

/// Build the full router over a shared, already-wired `Services` value.
#[must_use]
pub fn router(services: Arc<Services>) -> Router {
    Router::new()
        .route("/discovery/process", post(process))
        .route("/discovery/status/{processing_id}", get(status))
        .route("/discovery/cancel/{processing_id}", post(cancel))
        .route("/discovery/stream/{processing_id}", get(stream))
        .route("/search", post(search))
        .route("/facts/{fact_id}", post(edit_fact).delete(delete_fact))
        .route("/timeline", get(timeline))
        .layer(TraceLayer::new_for_http())
        .with_state(services)
}

const CASE_ID_HEADER: &str = "X-Case-Id";

/// Body of the 409 raised when `X-Case-Id` and `caseName` disagree (§6.1).
/// Not routed through `ApiError`: this is an edge-only consistency rule, not
/// a domain error kind, so it gets its own fixed status rather than going
/// through the `Error`-variant-to-status mapping (§10.5).
#[derive(serde::Serialize)]
struct CaseMismatchBody {
    error: &'static str,
    message: &'static str,
}

fn case_from_header_and_body(headers: &HeaderMap, body_case_name: &str) -> Result<CaseName, axum::response::Response> {
    let header_case = headers
        .get(CASE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError(mcb_domain::error::Error::input_invalid("missing X-Case-Id header")).into_response())?;

    if header_case != body_case_name {
        let body = CaseMismatchBody {
            error: "case_mismatch",
            message: "X-Case-Id header does not match request body caseName",
        };
        return Err((StatusCode::CONFLICT, Json(body)).into_response());
    }

    CaseName::parse(header_case).map_err(|e| ApiError(e).into_response())
}

fn parse_processing_id(raw: &str) -> Result<ProcessingId, ApiError> {
    uuid::Uuid::parse_str(raw)
        .map(ProcessingId)
        .map_err(|_| ApiError(mcb_domain::error::Error::input_invalid(format!("invalid processingId {raw}"))))
}

async fn process(State(services): State<Arc<Services>>, headers: HeaderMap, Json(body): Json<ProcessRequest>) -> impl IntoResponse {
    match handle_process(&services, headers, body).await {
        Ok(response) => (StatusCode::ACCEPTED, Json(response)).into_response(),
        Err(response) => response,
    }
}

async fn handle_process(
    services: &Services,
    headers: HeaderMap,
    body: ProcessRequest,
) -> Result<ProcessResponse, axum::response::Response> {
    let case = case_from_header_and_body(&headers, &body.case_name)?;

    let input_reference = match (body.files, body.remote_folder_ref) {
        (Some(files), _) => serialize_inline_files(&files).map_err(IntoResponse::into_response)?,
        (None, Some(folder)) => folder,
        (None, None) => {
            return Err(
                ApiError(mcb_domain::error::Error::input_invalid("request must supply either files or remoteFolderRef"))
                    .into_response(),
            )
        }
    };

    let request = mcb_domain::ports::JobRequest {
        case_name: case.clone(),
        user_id: headers
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("anonymous")
            .to_owned(),
        input_reference,
        production_metadata: body.production_metadata,
        enable_fact_extraction: body.enable_fact_extraction,
        enable_deficiency_analysis: body.enable_deficiency_analysis,
        rtp_document_id: body.rtp_document_id,
        oc_response_document_id: body.oc_response_document_id,
    };

    let processing_id = services.orchestrator.submit(request).await.map_err(|e| ApiError(e).into_response())?;

    Ok(ProcessResponse {
        processing_id,
        websocket_topic: format!("case:{}:job:{processing_id}", case.as_str()),
    })
}

fn serialize_inline_files(files: &[InlineFileDto]) -> Result<String, ApiError> {
    #[derive(serde::Serialize)]
    struct Entry<'a> {
        name: &'a str,
        #[serde(rename = "contentBase64")]
        content_base64: &'a str,
    }

    let entries: Vec<Entry<'_>> = files
        .iter()
        .map(|f| Entry {
            name: &f.name,
            content_base64: &f.content_base64,
        })
        .collect();

    serde_json::to_string(&entries)
        .map_err(|e| ApiError(mcb_domain::error::Error::internal(format!("failed to serialize inline files: {e}"))))
}

async fn status(State(services): State<Arc<Services>>, Path(processing_id): Path<String>) -> impl IntoResponse {
    match handle_status(&services, &processing_id).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle_status(services: &Services, processing_id: &str) -> Result<StatusResponse, ApiError> {
    let id = parse_processing_id(processing_id)?;
    let job = services.orchestrator.status(id).await?;
    Ok(StatusResponse::from(job))
}

async fn cancel(State(services): State<Arc<Services>>, Path(processing_id): Path<String>) -> impl IntoResponse {
    match parse_processing_id(&processing_id) {
        Ok(id) => match services.orchestrator.cancel(id).await {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(e) => ApiError(e).into_response(),
        },
        Err(e) => e.into_response(),
    }
}

async fn stream(
    State(services): State<Arc<Services>>,
    Path(processing_id): Path<String>,
    headers: HeaderMap,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>>, ApiError> {
    let id = parse_processing_id(&processing_id)?;
    let job = services.orchestrator.status(id).await?;
    let case = CaseName::parse(job.case_name).map_err(ApiError)?;

    let header_case = headers.get(CASE_ID_HEADER).and_then(|v| v.to_str().ok());
    if header_case.is_some_and(|h| h != case.as_str()) {
        return Err(ApiError(mcb_domain::error::Error::input_invalid(
            "X-Case-Id header does not match the job's case",
        )));
    }

    let raw = services.progress_bus.subscribe(&case, id).await?;
    let events = raw.map(|frame: ProgressFrame| {
        let payload = serde_json::to_string(&frame).unwrap_or_else(|_| "{}".to_owned());
        Ok(Event::default().data(payload))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

async fn search(
    State(services): State<Arc<Services>>,
    headers: HeaderMap,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let case = headers
        .get(CASE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError(mcb_domain::error::Error::input_invalid("missing X-Case-Id header")))?;
    let case = CaseName::parse(case).map_err(ApiError)?;

    let hits = services
        .hybrid_search
        .search(&case, &body.query, body.top_k, body.filters, SearchWeights::default())
        .await?;

    Ok(Json(SearchResponse {
        hits: hits.into_iter().map(HitDto::from).collect(),
    }))
}

#[derive(serde::Deserialize)]
struct TimelineQuery {
    #[serde(rename = "caseName")]
    case_name: String,
}

async fn timeline(State(services): State<Arc<Services>>, Query(query): Query<TimelineQuery>) -> impl IntoResponse {
    match handle_timeline(&services, &query.case_name).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle_timeline(services: &Services, case_name: &str) -> Result<Vec<mcb_application::TimelineEntry>, ApiError> {
    let case = CaseName::parse(case_name).map_err(ApiError)?;
    services.hybrid_search.timeline(&case).await.map_err(ApiError::from)
}

async fn edit_fact(
    State(services): State<Arc<Services>>,
    Path(fact_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<EditFactRequest>,
) -> impl IntoResponse {
    let case = match headers
        .get(CASE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError(mcb_domain::error::Error::input_invalid("missing X-Case-Id header")))
        .and_then(|c| CaseName::parse(c).map_err(ApiError))
    {
        Ok(case) => case,
        Err(e) => return e.into_response(),
    };

    match services
        .fact_extraction
        .edit_fact(&case, &fact_id, body.content, body.user_id, body.reason)
        .await
    {
        Ok(fact) => Json(fact).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn delete_fact(
    State(services): State<Arc<Services>>,
    Path(fact_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<DeleteFactRequest>,
) -> impl IntoResponse {
    let case = match headers
        .get(CASE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError(mcb_domain::error::Error::input_invalid("missing X-Case-Id header")))
        .and_then(|c| CaseName::parse(c).map_err(ApiError))
    {
        Ok(case) => case,
        Err(e) => return e.into_response(),
    };

    match services.fact_extraction.delete_fact(&case, &fact_id, body.user_id, body.reason).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

//! Maps `mcb_domain::error::Error` to HTTP responses (§10.5).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mcb_domain::error::Error;
use serde::Serialize;

/// Thin newtype over the domain error so `mcb-server` can implement
/// `IntoResponse` without `mcb-domain` taking an axum dependency.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self.0 {
            Error::InputInvalid { .. } => (StatusCode::BAD_REQUEST, "input_invalid"),
            Error::AccessDenied { .. } => (StatusCode::FORBIDDEN, "access_denied"),
            Error::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            Error::Transient { .. } | Error::BackendUnavailable { .. } => (StatusCode::SERVICE_UNAVAILABLE, "backend_unavailable"),
            Error::ComponentFailure { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "component_failure"),
            Error::Cancelled => (StatusCode::CONFLICT, "cancelled"),
            Error::IoSimple { .. } | Error::Json { .. } | Error::Config { .. } | Error::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };

        if matches!(self.0, Error::AccessDenied { .. }) {
            tracing::error!(error = %self.0, "access denied");
        } else if matches!(self.0, Error::ComponentFailure { .. }) {
            tracing::warn!(error = %self.0, "component failure reached the edge");
        }

        let body = ErrorBody {
            error: kind.to_owned(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

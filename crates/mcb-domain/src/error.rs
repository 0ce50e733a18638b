//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the discovery processing engine.
///
/// Every variant maps to exactly one of the seven error kinds surfaced to
/// callers (input, access, not-found, transient, backend, component,
/// cancelled); the mapping to HTTP status lives at the server edge, not here.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed request or unparseable document; never retried.
    #[error("invalid input: {message}")]
    InputInvalid {
        /// Description of what was invalid
        message: String,
    },

    /// Case-isolation or permission violation; never retried, logged as a security event.
    #[error("access denied: {message}")]
    AccessDenied {
        /// Description of the denied access
        message: String,
    },

    /// Unknown caseName, processingId, documentId, or similar resource.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Transient failure (network timeout, backend 5xx, rate limit) eligible for retry.
    #[error("transient failure: {message}")]
    Transient {
        /// Description of the transient condition
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Persistent infrastructure failure after the retry budget is exhausted.
    #[error("backend unavailable: {message}")]
    BackendUnavailable {
        /// Description of the backend failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A single component (boundary detector, classifier, fact extractor) failed on one segment.
    #[error("component '{stage}' failed on segment: {message}")]
    ComponentFailure {
        /// Pipeline stage that failed (e.g. "boundary_detector", "classifier")
        stage: String,
        /// Document the failing segment belongs to, if known
        document_id: Option<String>,
        /// Segment that failed, if known
        segment_id: Option<String>,
        /// Description of the failure
        message: String,
    },

    /// Cooperative cancellation observed at an operation boundary.
    #[error("cancelled")]
    Cancelled,

    /// I/O operation error (simple form)
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Configuration-related error
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal invariant violation; should not be reachable in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl Error {
    /// Create an [`Error::InputInvalid`]
    pub fn input_invalid<S: Into<String>>(message: S) -> Self {
        Self::InputInvalid {
            message: message.into(),
        }
    }

    /// Create an [`Error::AccessDenied`]
    pub fn access_denied<S: Into<String>>(message: S) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Create an [`Error::NotFound`]
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an [`Error::Transient`]
    pub fn transient<S: Into<String>>(message: S) -> Self {
        Self::Transient {
            message: message.into(),
            source: None,
        }
    }

    /// Create an [`Error::Transient`] with a source error
    pub fn transient_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Transient {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an [`Error::BackendUnavailable`]
    pub fn backend_unavailable<S: Into<String>>(message: S) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Create an [`Error::BackendUnavailable`] with a source error
    pub fn backend_unavailable_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an [`Error::ComponentFailure`]
    pub fn component_failure<S: Into<String>, M: Into<String>>(stage: S, message: M) -> Self {
        Self::ComponentFailure {
            stage: stage.into(),
            document_id: None,
            segment_id: None,
            message: message.into(),
        }
    }

    /// Attach document/segment provenance to a [`Error::ComponentFailure`]
    #[must_use]
    pub fn with_segment(mut self, document_id: impl Into<String>, segment_id: impl Into<String>) -> Self {
        if let Self::ComponentFailure {
            document_id: d,
            segment_id: s,
            ..
        } = &mut self
        {
            *d = Some(document_id.into());
            *s = Some(segment_id.into());
        }
        self
    }

    /// Create an [`Error::Config`]
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create an [`Error::Config`] with a source error
    pub fn config_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an [`Error::Internal`]
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True if this error kind is safe to retry under the orchestrator's backoff policy.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

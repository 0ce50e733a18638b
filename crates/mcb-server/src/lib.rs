//! HTTP edge for the discovery processing engine.
//!
//! Thin `axum` layer: request/response DTOs, error-to-status mapping, and
//! route wiring over an already-assembled `mcb_infrastructure::Services`.
//! No business logic lives here; every handler delegates to a use-case
//! service or the orchestrator port.

pub mod dto;
pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::router;

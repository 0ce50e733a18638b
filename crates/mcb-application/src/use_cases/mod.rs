//! Use-case services, one module per service (§4).

pub mod fact_extraction_service;
pub mod hybrid_search_service;
pub mod orchestrator_service;

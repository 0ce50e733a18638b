//! Discovery processing engine binary support.
//!
//! Wires the concrete `mcb-providers` adapters into an `mcb_infrastructure::Services`
//! value and exposes it over the `mcb-server` `axum` router. All of the business
//! logic lives in the lower crates; this crate is startup plumbing only.

pub mod wiring;

//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns that sit below the application layer:
//! layered configuration (§10.3), the explicit `Services` wiring value that
//! replaces the reference codebase's DI container/singletons (§9), the
//! progress-bus implementation (§4.9), and the per-job scoped working area
//! (§9 redesign flag).
//!
//! `mcb-providers` supplies the concrete port implementations; this crate
//! only owns the pieces that have no natural home as a "provider" because
//! they are process-wide wiring rather than a single external collaborator.

pub mod config;
pub mod lifecycle;
pub mod progress_bus;
pub mod services;
pub mod working_area;

pub use config::Config;
pub use lifecycle::{DependencyHealth, HealthStatus};
pub use progress_bus::InProcessProgressBus;
pub use services::Services;
pub use working_area::WorkingArea;

//! Dependency health reporting.
//!
//! Mirrors the reference codebase's `LifecycleManaged`/`DependencyHealth`
//! shape so an operator dashboard built against that convention needs no
//! retraining: every long-lived collaborator (vector store, LLM client,
//! embedding backend) can report a `DependencyHealth` snapshot, and
//! `Services::health` aggregates them into one process-wide view.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Coarse health classification for one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Fully operational.
    Healthy,
    /// Operational but degraded (elevated latency, partial capacity).
    Degraded,
    /// Not operational.
    Unhealthy,
}

/// A point-in-time health snapshot for one named dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyHealth {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub latency: Option<Duration>,
}

impl DependencyHealth {
    #[must_use]
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Healthy,
            message: None,
            latency: None,
        }
    }

    #[must_use]
    pub fn degraded(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Degraded,
            message: Some(message.into()),
            latency: None,
        }
    }

    #[must_use]
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
            latency: None,
        }
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

/// A collaborator that can report its own health for the aggregate check.
#[async_trait]
pub trait LifecycleManaged: Send + Sync {
    /// Name used as the key in the aggregate health report.
    fn component_name(&self) -> &str;

    /// Probe this dependency and report its current health.
    async fn health_check(&self) -> DependencyHealth;
}

/// Aggregate of every managed dependency's latest health snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateHealth {
    pub overall: HealthStatus,
    pub dependencies: BTreeMap<String, DependencyHealth>,
}

impl AggregateHealth {
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<DependencyHealth>) -> Self {
        let overall = if snapshots.iter().any(|d| d.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if snapshots.iter().any(|d| d.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };
        let dependencies = snapshots.into_iter().map(|d| (d.name.clone(), d)).collect();
        Self { overall, dependencies }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_is_unhealthy_if_any_dependency_is() {
        let agg = AggregateHealth::from_snapshots(vec![
            DependencyHealth::healthy("vector_store"),
            DependencyHealth::unhealthy("llm_client", "timeout"),
        ]);
        assert_eq!(agg.overall, HealthStatus::Unhealthy);
        assert_eq!(agg.dependencies.len(), 2);
    }

    #[test]
    fn overall_is_degraded_when_no_unhealthy_present() {
        let agg = AggregateHealth::from_snapshots(vec![
            DependencyHealth::healthy("vector_store"),
            DependencyHealth::degraded("llm_client", "slow"),
        ]);
        assert_eq!(agg.overall, HealthStatus::Degraded);
    }

    #[test]
    fn overall_is_healthy_when_all_are() {
        let agg = AggregateHealth::from_snapshots(vec![DependencyHealth::healthy("vector_store")]);
        assert_eq!(agg.overall, HealthStatus::Healthy);
    }
}

//! Progress bus port (§4.9).

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::Result;
use crate::events::ProgressFrame;
use crate::value_objects::{CaseName, ProcessingId};

/// Boxed stream of progress frames for one topic subscription.
pub type ProgressStream = Pin<Box<dyn Stream<Item = ProgressFrame> + Send + 'static>>;

/// Topic-based pub/sub for per-job progress events (§4.9).
///
/// Topic key is `case:{caseName}:job:{processingId}`. Single-producer per
/// topic (only the orchestrator publishes); safe for concurrent
/// publish/subscribe. Implementations must drop the slowest subscribers past
/// a bounded buffer rather than block the publisher.
#[async_trait]
pub trait ProgressBus: Send + Sync {
    /// Publish `event` to the job's topic, stamping it with the next `seq` for that topic.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bus itself is unable to accept the event
    /// (e.g. shutting down); a topic with no subscribers is not an error.
    async fn publish(
        &self,
        case: &CaseName,
        processing_id: ProcessingId,
        event: crate::events::ProgressEvent,
    ) -> Result<()>;

    /// Subscribe to a job's topic. The returned stream starts with a `Hello`
    /// frame carrying the last seq already published, then yields events
    /// published after the call (no replay of events before subscription).
    ///
    /// # Errors
    ///
    /// Returns an error if the topic cannot be opened.
    async fn subscribe(&self, case: &CaseName, processing_id: ProcessingId) -> Result<ProgressStream>;

    /// True if at least one subscriber is attached to the job's topic.
    fn has_subscribers(&self, case: &CaseName, processing_id: ProcessingId) -> bool;
}

//! In-process implementation of the `ProgressBus` port (§4.9).
//!
//! One `tokio::sync::broadcast` channel per topic, keyed in a `DashMap` the
//! way the reference codebase's event-bus provider keys per-channel state.
//! A lagging subscriber (one that falls behind the bounded buffer) simply
//! skips the events it missed rather than blocking the publisher or other
//! subscribers, matching the port's "drop the slowest subscriber" contract.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use mcb_domain::constants::DEFAULT_PROGRESS_BUS_BUFFER;
use mcb_domain::error::Result;
use mcb_domain::events::{ProgressEvent, ProgressFrame};
use mcb_domain::ports::{ProgressBus, ProgressStream};
use mcb_domain::value_objects::{CaseName, ProcessingId};
use tokio::sync::broadcast;

struct Topic {
    sender: broadcast::Sender<ProgressFrame>,
    seq: AtomicU64,
}

/// Single-process pub/sub for job progress, topic-keyed on `case:{caseName}:job:{processingId}`.
pub struct InProcessProgressBus {
    topics: DashMap<String, Arc<Topic>>,
    buffer: usize,
}

impl InProcessProgressBus {
    /// Construct a bus whose per-topic channels hold `buffer` events before
    /// the slowest subscriber starts missing frames.
    #[must_use]
    pub fn new(buffer: usize) -> Self {
        Self {
            topics: DashMap::new(),
            buffer,
        }
    }

    fn topic_key(case: &CaseName, processing_id: ProcessingId) -> String {
        format!("case:{}:job:{processing_id}", case.as_str())
    }

    fn topic_for(&self, key: &str) -> Arc<Topic> {
        self.topics
            .entry(key.to_owned())
            .or_insert_with(|| {
                Arc::new(Topic {
                    sender: broadcast::channel(self.buffer).0,
                    seq: AtomicU64::new(0),
                })
            })
            .clone()
    }
}

impl Default for InProcessProgressBus {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_BUS_BUFFER)
    }
}

#[async_trait]
impl ProgressBus for InProcessProgressBus {
    async fn publish(&self, case: &CaseName, processing_id: ProcessingId, event: ProgressEvent) -> Result<()> {
        let key = Self::topic_key(case, processing_id);
        let topic = self.topic_for(&key);
        let seq = topic.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let frame = ProgressFrame::Event {
            seq,
            ts: Utc::now(),
            event,
        };
        // No receivers is not an error (§4.9): the publisher never blocks on subscribers.
        let _ = topic.sender.send(frame);
        Ok(())
    }

    async fn subscribe(&self, case: &CaseName, processing_id: ProcessingId) -> Result<ProgressStream> {
        let key = Self::topic_key(case, processing_id);
        let topic = self.topic_for(&key);
        let last_seq = topic.seq.load(Ordering::SeqCst);
        let mut receiver = topic.sender.subscribe();

        let stream = async_stream::stream! {
            yield ProgressFrame::Hello { last_seq };
            loop {
                match receiver.recv().await {
                    Ok(frame) => yield frame,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };
        Ok(Box::pin(stream))
    }

    fn has_subscribers(&self, case: &CaseName, processing_id: ProcessingId) -> bool {
        let key = Self::topic_key(case, processing_id);
        self.topics.get(&key).is_some_and(|t| t.sender.receiver_count() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn subscribe_yields_hello_first() {
        let bus = InProcessProgressBus::new(16);
        let case = CaseName::parse("case1").expect("valid");
        let processing_id = ProcessingId::new();
        let mut stream = bus.subscribe(&case, processing_id).await.expect("subscribe ok");
        let first = stream.next().await.expect("hello frame");
        assert!(matches!(first, ProgressFrame::Hello { last_seq: 0 }));
    }

    #[tokio::test]
    async fn published_events_are_seq_stamped_in_order() {
        let bus = InProcessProgressBus::new(16);
        let case = CaseName::parse("case1").expect("valid");
        let processing_id = ProcessingId::new();
        let mut stream = bus.subscribe(&case, processing_id).await.expect("subscribe ok");
        let _ = stream.next().await; // Hello

        bus.publish(&case, processing_id, ProgressEvent::JobStarted { total_files: 3 })
            .await
            .expect("publish ok");
        bus.publish(&case, processing_id, ProgressEvent::JobCancelled { reason: "x".to_owned() })
            .await
            .expect("publish ok");

        let first = stream.next().await.expect("event 1");
        let second = stream.next().await.expect("event 2");
        let ProgressFrame::Event { seq: seq1, .. } = first else { panic!("expected event frame") };
        let ProgressFrame::Event { seq: seq2, .. } = second else { panic!("expected event frame") };
        assert_eq!(seq1, 1);
        assert_eq!(seq2, 2);
    }

    #[tokio::test]
    async fn has_subscribers_reflects_active_receivers() {
        let bus = InProcessProgressBus::new(16);
        let case = CaseName::parse("case1").expect("valid");
        let processing_id = ProcessingId::new();
        assert!(!bus.has_subscribers(&case, processing_id));
        let stream = bus.subscribe(&case, processing_id).await.expect("subscribe ok");
        assert!(bus.has_subscribers(&case, processing_id));
        drop(stream);
    }
}

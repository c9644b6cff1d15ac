//! Outbound domain events and the publisher seam that delivers them to
//! HRIS systems, with the same exponential retry/backoff used for
//! provider calls (§6).

use async_trait::async_trait;
use invest_config::RetryConfig;
use invest_core::Id;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::status::InvestigationStatus;

/// A fact worth telling the outside world about, emitted at the
/// lifecycle points named in §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// An investigation began collecting.
    ScreeningStarted {
        /// The investigation this event concerns.
        investigation_id: String,
        /// The subject entity.
        subject_entity_id: Id,
    },
    /// A phase boundary was crossed.
    ScreeningProgress {
        /// The investigation this event concerns.
        investigation_id: String,
        /// The phase just reached, as a label (`"foundation"`,
        /// `"records"`, …).
        phase: String,
    },
    /// A profile was committed; the investigation reached a terminal,
    /// successful state.
    ScreeningComplete {
        /// The investigation this event concerns.
        investigation_id: String,
        /// The committed profile's final risk score.
        risk_score: f64,
    },
    /// The risk level requires a human reviewer before any adverse
    /// action proceeds.
    ReviewRequired {
        /// The investigation this event concerns.
        investigation_id: String,
        /// The risk level that triggered review.
        level: String,
    },
    /// A finding reached the severity where an adverse employment action
    /// may be considered, triggering whatever notice process the
    /// tenant's jurisdiction requires.
    AdverseActionPending {
        /// The investigation this event concerns.
        investigation_id: String,
        /// The finding category driving the action.
        category: String,
    },
    /// An ongoing-monitoring refresh produced a meaningfully changed
    /// profile delta.
    AlertGenerated {
        /// The investigation this event concerns.
        investigation_id: String,
        /// Human-readable description of what changed.
        detail: String,
    },
}

/// Publishes [`DomainEvent`]s to whatever transport the deployment wires
/// up (webhook, message queue, …). Implementations apply their own
/// retry/backoff; [`RetryingEventPublisher`] is the reference wrapper
/// that adds retry to any inner transport.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one event. Implementations should retry transient
    /// failures internally and only return `Err` once retries are
    /// exhausted.
    async fn publish(&self, event: DomainEvent) -> Result<(), String>;
}

/// A transport a [`RetryingEventPublisher`] wraps: a single delivery
/// attempt, fallible.
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Attempt one delivery. `Err` is assumed transient.
    async fn send(&self, event: &DomainEvent) -> Result<(), String>;
}

/// Wraps any [`EventTransport`] with exponential backoff retry, the same
/// shape as the provider router's retry loop (§4.B), reusing
/// [`RetryConfig`] rather than a bespoke streaming-specific one.
pub struct RetryingEventPublisher<T: EventTransport> {
    transport: T,
    retry: RetryConfig,
}

impl<T: EventTransport> RetryingEventPublisher<T> {
    /// Wrap `transport` with `retry`'s backoff schedule.
    pub fn new(transport: T, retry: RetryConfig) -> Self {
        Self { transport, retry }
    }
}

#[async_trait]
impl<T: EventTransport> EventPublisher for RetryingEventPublisher<T> {
    #[instrument(skip(self, event))]
    async fn publish(&self, event: DomainEvent) -> Result<(), String> {
        let mut last_error = String::new();
        for attempt in 1..=self.retry.max_attempts {
            match self.transport.send(&event).await {
                Ok(()) => return Ok(()),
                Err(message) => {
                    warn!(attempt, %message, "event delivery attempt failed");
                    last_error = message;
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.base_delay_for_attempt(attempt)).await;
                    }
                }
            }
        }
        Err(last_error)
    }
}

/// An in-memory publisher that records every event it receives,
/// succeeding unconditionally. The reference implementation for tests
/// and for deployments with no HRIS wired up.
#[derive(Default)]
pub struct InMemoryEventPublisher {
    received: Mutex<Vec<DomainEvent>>,
}

impl InMemoryEventPublisher {
    /// A fresh, empty publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event received so far, oldest first.
    pub fn received(&self) -> Vec<DomainEvent> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), String> {
        self.received.lock().push(event);
        Ok(())
    }
}

/// A human-readable label for the status an investigation just entered,
/// for event payloads that carry a status string.
pub fn status_label(status: InvestigationStatus) -> String {
    status.to_string()
}

/// Shared handle alias, since every pipeline holds its publisher behind
/// an `Arc<dyn EventPublisher>`.
pub type SharedEventPublisher = Arc<dyn EventPublisher>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyTransport {
        fail_first_n: AtomicU32,
    }

    #[async_trait]
    impl EventTransport for FlakyTransport {
        async fn send(&self, _event: &DomainEvent) -> Result<(), String> {
            if self.fail_first_n.fetch_sub(1, Ordering::SeqCst) > 0 {
                Err("transient failure".to_string())
            } else {
                Ok(())
            }
        }
    }

    struct AlwaysFailsTransport;

    #[async_trait]
    impl EventTransport for AlwaysFailsTransport {
        async fn send(&self, _event: &DomainEvent) -> Result<(), String> {
            Err("permanent failure".to_string())
        }
    }

    #[tokio::test]
    async fn retries_until_the_transport_recovers() {
        let mut retry = RetryConfig::defaults();
        retry.base_delay_ms = 1;
        let publisher = RetryingEventPublisher::new(FlakyTransport { fail_first_n: AtomicU32::new(2) }, retry);
        let event = DomainEvent::ScreeningStarted { investigation_id: "inv-1".to_string(), subject_entity_id: Id::new() };
        assert!(publisher.publish(event).await.is_ok());
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let mut retry = RetryConfig::defaults();
        retry.base_delay_ms = 1;
        retry.max_attempts = 2;
        let publisher = RetryingEventPublisher::new(AlwaysFailsTransport, retry);
        let event = DomainEvent::ScreeningComplete { investigation_id: "inv-1".to_string(), risk_score: 10.0 };
        assert!(publisher.publish(event).await.is_err());
    }

    #[tokio::test]
    async fn in_memory_publisher_records_every_event_in_order() {
        let publisher = InMemoryEventPublisher::new();
        publisher
            .publish(DomainEvent::ScreeningStarted { investigation_id: "inv-2".to_string(), subject_entity_id: Id::new() })
            .await
            .unwrap();
        publisher
            .publish(DomainEvent::ScreeningComplete { investigation_id: "inv-2".to_string(), risk_score: 5.0 })
            .await
            .unwrap();
        assert_eq!(publisher.received().len(), 2);
    }
}

//! Appearance event bus for the Folio workspace.
//!
//! The bus carries typed appearance events with sequential identifiers and
//! supports replaying recent events when subscribers reconnect (e.g. a style
//! injector or SSE client that supplies `Last-Event-ID`). Internally it uses
//! `tokio::broadcast` with a bounded buffer; when the channel overflows, the
//! oldest events are dropped.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::{Receiver, Sender};

/// Identifier assigned to each event emitted by the bus.
pub type EventId = u64;

/// Default buffer size for the in-memory replay ring.
const DEFAULT_REPLAY_CAPACITY: usize = 256;

/// Appearance events surfaced to asynchronous consumers.
///
/// `domain` is the settings domain name (`layout`, `theme`, `responsive`,
/// `typography`); `revision` is the per-domain mutation counter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A domain was hydrated from storage or defaults.
    DomainLoaded { domain: String, revision: u64 },
    /// A domain accepted a patch, preset or font pair.
    DomainUpdated { domain: String, revision: u64 },
    /// A domain was restored to its defaults.
    DomainReset { domain: String, revision: u64 },
    /// A domain was durably stored.
    DomainSaved { domain: String, revision: u64 },
}

impl Event {
    /// Machine-friendly discriminator for SSE consumers.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DomainLoaded { .. } => "domain_loaded",
            Self::DomainUpdated { .. } => "domain_updated",
            Self::DomainReset { .. } => "domain_reset",
            Self::DomainSaved { .. } => "domain_saved",
        }
    }

    /// Name of the domain the event refers to.
    #[must_use]
    pub fn domain(&self) -> &str {
        match self {
            Self::DomainLoaded { domain, .. }
            | Self::DomainUpdated { domain, .. }
            | Self::DomainReset { domain, .. }
            | Self::DomainSaved { domain, .. } => domain,
        }
    }
}

/// Metadata wrapper around events. Each envelope tracks the event id and
/// emission timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    pub event: Event,
}

/// Shared event bus built on top of `tokio::broadcast`.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    buffer: Arc<Mutex<VecDeque<EventEnvelope>>>,
    next_id: Arc<AtomicU64>,
    replay_capacity: usize,
}

impl EventBus {
    /// Construct a new bus with the provided broadcast capacity.
    ///
    /// The broadcast channel uses the same capacity as the in-memory replay
    /// buffer, so dropped events impact both structures consistently.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "event bus capacity must be positive");
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            next_id: Arc::new(AtomicU64::new(1)),
            replay_capacity: capacity,
        }
    }

    /// Construct a bus with the default in-memory buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish a new event to the bus, assigning it a sequential identifier.
    ///
    /// Publishing never blocks and never fails; with no live subscribers the
    /// event is only retained in the replay ring.
    pub fn publish(&self, event: Event) -> EventId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };

        {
            let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            if buffer.len() == self.replay_capacity {
                buffer.pop_front();
            }
            buffer.push_back(envelope.clone());
        }

        let _ = self.sender.send(envelope);
        id
    }

    /// Subscribe to the bus, replaying any buffered events newer than `since_id`.
    #[must_use]
    pub fn subscribe(&self, since_id: Option<EventId>) -> EventStream {
        let mut backlog = VecDeque::new();
        // Subscribe before draining the ring so nothing published in between is lost.
        let receiver = self.sender.subscribe();
        if let Some(since) = since_id {
            let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            backlog.extend(buffer.iter().filter(|item| item.id > since).cloned());
        }

        let last_replayed = backlog.back().map(|item: &EventEnvelope| item.id);
        EventStream {
            backlog,
            receiver,
            last_replayed,
        }
    }

    /// Returns the last assigned identifier, if any events have been published.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.back().map(|event| event.id)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream wrapper that yields events either from the replay backlog or from the
/// live broadcast channel.
pub struct EventStream {
    backlog: VecDeque<EventEnvelope>,
    receiver: Receiver<EventEnvelope>,
    last_replayed: Option<EventId>,
}

impl EventStream {
    /// Receive the next event, respecting the replay backlog first.
    ///
    /// Live events already delivered through the backlog are skipped.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }

        loop {
            let envelope = match self.receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            };
            if self.last_replayed.is_some_and(|last| envelope.id <= last) {
                continue;
            }
            return Some(envelope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn updated(domain: &str, revision: u64) -> Event {
        Event::DomainUpdated {
            domain: domain.to_string(),
            revision,
        }
    }

    #[tokio::test]
    async fn sequential_ids_and_replay() {
        let bus = EventBus::with_capacity(16);

        let mut last_id = 0;
        for revision in 0..5 {
            last_id = bus.publish(updated("layout", revision));
        }
        assert_eq!(last_id, 5);

        let mut stream = bus.subscribe(Some(2));
        let mut received = Vec::new();
        for _ in 0..3 {
            if let Some(event) = stream.next().await {
                received.push(event);
            }
        }

        assert_eq!(received.len(), 3);
        assert_eq!(received.first().map(|e| e.id), Some(3));
        assert_eq!(received.last().map(|e| e.id), Some(5));
    }

    #[tokio::test]
    async fn replay_does_not_duplicate_live_events() {
        let bus = EventBus::with_capacity(8);
        bus.publish(updated("theme", 1));
        let mut stream = bus.subscribe(Some(0));
        bus.publish(updated("theme", 2));

        let first = stream.next().await.map(|e| e.id);
        let second = timeout(Duration::from_secs(1), stream.next())
            .await
            .ok()
            .flatten()
            .map(|e| e.id);
        assert_eq!(first, Some(1));
        assert_eq!(second, Some(2));
    }

    #[test]
    fn ring_drops_oldest_when_full() {
        let bus = EventBus::with_capacity(2);
        for revision in 0..4 {
            bus.publish(updated("typography", revision));
        }
        assert_eq!(bus.last_event_id(), Some(4));
    }

    #[test]
    fn kinds_and_serialization_are_stable() {
        let event = Event::DomainSaved {
            domain: "responsive".into(),
            revision: 3,
        };
        assert_eq!(event.kind(), "domain_saved");
        assert_eq!(event.domain(), "responsive");
        let json = serde_json::to_value(&event).expect("event serializes");
        assert_eq!(json["type"], "domain_saved");
        assert_eq!(json["revision"], 3);
    }
}

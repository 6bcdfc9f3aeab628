//! # Event Log Adapter
//!
//! In-memory [`EventSink`] that records every published event.

use crate::events::RelayEvent;
use crate::ports::outbound::EventSink;
use parking_lot::RwLock;
use tracing::trace;

/// Append-only in-memory event log.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: RwLock<Vec<RelayEvent>>,
}

impl InMemoryEventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<RelayEvent> {
        self.events.read().clone()
    }

    /// Events with the given name.
    #[must_use]
    pub fn named(&self, name: &str) -> Vec<RelayEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| event.name() == name)
            .cloned()
            .collect()
    }

    /// Number of events recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl EventSink for InMemoryEventLog {
    fn publish(&self, event: RelayEvent) {
        trace!(event = event.name(), "Event published");
        self.events.write().push(event);
    }
}

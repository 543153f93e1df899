//! In-memory subscriber that records every event

use crate::events::subscriber::{EventSubscriber, PublishedEvent};
use crate::events::types::ProvisionEvent;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Records published events, mostly useful for tests and run summaries
#[derive(Default)]
pub struct MemorySubscriber {
    events: Mutex<Vec<ProvisionEvent>>,
}

impl MemorySubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events recorded so far
    pub fn events(&self) -> Vec<ProvisionEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl EventSubscriber for MemorySubscriber {
    async fn handle_event(
        &self,
        event: &PublishedEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.events.lock().push(event.event.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }

    fn is_interested(&self, _event: &ProvisionEvent) -> bool {
        true
    }
}

//! Event subscriber trait and published events

use crate::events::types::ProvisionEvent;
use std::time::SystemTime;

/// An event together with the time it was published
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    /// The actual event
    pub event: ProvisionEvent,
    /// Timestamp when the event occurred
    pub timestamp: SystemTime,
}

/// Trait for event subscribers
#[async_trait::async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Handle an event
    async fn handle_event(
        &self,
        event: &PublishedEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Subscriber name for debugging
    fn name(&self) -> &'static str;

    /// Check if subscriber is interested in this event
    fn is_interested(&self, event: &ProvisionEvent) -> bool;
}

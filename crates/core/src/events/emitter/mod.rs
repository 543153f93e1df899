//! Event emitter for publishing progress events

use crate::events::subscriber::{EventSubscriber, PublishedEvent};
use crate::events::types::ProvisionEvent;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;
use tracing::{debug, error};

/// Event emitter for publishing events
///
/// `emit` returns only after every interested subscriber handled the event,
/// so subscribers observe events in publication order.
#[derive(Default)]
pub struct EventEmitter {
    /// Registered subscribers
    subscribers: RwLock<Vec<Arc<dyn EventSubscriber>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber
    pub async fn add_subscriber(&self, subscriber: Arc<dyn EventSubscriber>) {
        debug!("Event subscriber added: {}", subscriber.name());
        self.subscribers.write().await.push(subscriber);
    }

    /// Emit an event to all interested subscribers
    pub async fn emit(&self, event: ProvisionEvent) {
        let published = PublishedEvent {
            event,
            timestamp: SystemTime::now(),
        };

        self.notify_subscribers(&published).await;
    }

    /// Notify all interested subscribers
    async fn notify_subscribers(&self, event: &PublishedEvent) {
        let subscribers = self.subscribers.read().await;

        let interested: Vec<_> = subscribers
            .iter()
            .filter(|subscriber| subscriber.is_interested(&event.event))
            .collect();

        if interested.is_empty() {
            return;
        }

        let handles: Vec<_> = interested
            .iter()
            .map(|subscriber| {
                let subscriber = Arc::clone(subscriber);
                async move {
                    if let Err(e) = subscriber.handle_event(event).await {
                        error!(
                            subscriber = subscriber.name(),
                            error = %e,
                            "Event subscriber failed to handle event"
                        );
                    }
                }
            })
            .collect();

        futures::future::join_all(handles).await;

        debug!(
            kind = ?event.event.kind,
            phase = ?event.event.phase,
            subscribers_notified = interested.len(),
            "Event published to subscribers"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::memory::MemorySubscriber;
    use crate::events::types::{EventKind, Phase};

    #[tokio::test]
    async fn test_emit_reaches_subscribers_in_order() {
        let emitter = EventEmitter::new();
        let recorder = Arc::new(MemorySubscriber::new());
        emitter.add_subscriber(recorder.clone()).await;

        emitter
            .emit(ProvisionEvent::new(EventKind::Task, Phase::Started, "h").task("a"))
            .await;
        emitter
            .emit(ProvisionEvent::new(EventKind::Task, Phase::Finished, "h").task("a"))
            .await;

        let phases: Vec<_> = recorder.events().iter().map(|e| e.phase).collect();
        assert_eq!(phases, vec![Phase::Started, Phase::Finished]);
    }

    struct TasksOnly(MemorySubscriber);

    #[async_trait::async_trait]
    impl EventSubscriber for TasksOnly {
        async fn handle_event(
            &self,
            event: &PublishedEvent,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.0.handle_event(event).await
        }

        fn name(&self) -> &'static str {
            "tasks-only"
        }

        fn is_interested(&self, event: &ProvisionEvent) -> bool {
            event.kind == EventKind::Task
        }
    }

    #[tokio::test]
    async fn test_uninterested_subscriber_is_skipped() {
        let emitter = EventEmitter::default();
        let tasks = Arc::new(TasksOnly(MemorySubscriber::new()));
        emitter.add_subscriber(tasks.clone()).await;

        emitter
            .emit(ProvisionEvent::new(EventKind::Internal, Phase::Started, "h"))
            .await;
        emitter
            .emit(ProvisionEvent::new(EventKind::Task, Phase::Started, "h").task("a"))
            .await;

        let kinds: Vec<_> = tasks.0.events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Task]);
    }
}

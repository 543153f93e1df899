//! JSON-lines event log
//!
//! Every event becomes one line: `{"timestamp": <millis>, "event": {...}}`.

mod writer;

pub use writer::LogWriter;

use crate::events::subscriber::{EventSubscriber, PublishedEvent};
use crate::events::types::ProvisionEvent;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subscriber appending every event to a JSON-lines file
pub struct JsonLogSubscriber {
    file_path: PathBuf,
    writer: LogWriter,
}

impl JsonLogSubscriber {
    /// Open the log file, creating it when missing
    pub async fn new(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();
        let writer = LogWriter::new(&file_path)
            .await
            .map_err(|e| Error::file_system(&file_path, "open event log", e))?;
        Ok(Self { file_path, writer })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Flush and close the underlying file
    pub async fn close(&self) {
        self.writer.close().await;
    }
}

/// Format an event as a single JSON line
pub fn format_event(event: &PublishedEvent) -> Result<String> {
    let millis = event
        .timestamp
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let line = serde_json::json!({
        "timestamp": millis,
        "event": event.event,
    });
    Ok(serde_json::to_string(&line)?)
}

#[async_trait]
impl EventSubscriber for JsonLogSubscriber {
    async fn handle_event(
        &self,
        event: &PublishedEvent,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let formatted = format_event(event)?;
        self.writer.write_line(&formatted).await?;
        debug!(log_file = %self.file_path.display(), "JSON log event written");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json_log"
    }

    fn is_interested(&self, _event: &ProvisionEvent) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::{EventKind, Phase};
    use std::time::SystemTime;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_events_are_appended_as_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        let subscriber = JsonLogSubscriber::new(&path).await.unwrap();

        for phase in [Phase::Started, Phase::Finished] {
            let event = PublishedEvent {
                event: ProvisionEvent::new(EventKind::Task, phase, "web-1").task("webserver"),
                timestamp: SystemTime::now(),
            };
            subscriber.handle_event(&event).await.unwrap();
        }
        subscriber.close().await;

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"]["phase"], "started");
        assert_eq!(first["event"]["task"], "webserver");
        assert!(first["timestamp"].as_u64().unwrap() > 0);
    }
}

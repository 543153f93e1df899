//! Console event subscriber for terminal output

use crate::events::subscriber::{EventSubscriber, PublishedEvent};
use crate::events::types::{EventKind, ExecStatus, Phase, ProvisionEvent};
use async_trait::async_trait;
use std::io;
use tracing::debug;

/// Console subscriber for terminal output
pub struct ConsoleSubscriber {
    /// Use colored output
    use_colors: bool,
    /// Verbosity level
    verbosity: ConsoleVerbosity,
}

/// Console verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleVerbosity {
    /// Only failures
    Quiet,
    /// Tasks and executed commands (default)
    Normal,
    /// Everything including cache hits and internal housekeeping
    Verbose,
}

impl ConsoleSubscriber {
    /// Create a new console subscriber with default settings
    pub fn new() -> Self {
        Self {
            use_colors: io::IsTerminal::is_terminal(&io::stderr()),
            verbosity: ConsoleVerbosity::Normal,
        }
    }

    /// Create a console subscriber with custom settings
    pub fn with_config(use_colors: bool, verbosity: ConsoleVerbosity) -> Self {
        Self {
            use_colors,
            verbosity,
        }
    }

    /// Format an event for console output
    fn format_event(&self, event: &ProvisionEvent) -> Option<String> {
        let host = &event.hostname;
        let task = event.task.as_deref().unwrap_or("-");
        let dry = if event.dry_run { " (dry run)" } else { "" };

        match (event.kind, event.phase) {
            (_, Phase::Failed) => Some(self.colorize(
                &format!(
                    "✗ [{host}] {task}: {}",
                    event.error.as_deref().unwrap_or("failed")
                ),
                "red",
            )),
            (EventKind::Task, Phase::Started) => {
                Some(self.colorize(&format!("▶ [{host}] task '{task}'{dry}"), "blue"))
            }
            (EventKind::Task, _) => {
                Some(self.colorize(&format!("✓ [{host}] task '{task}' done{dry}"), "green"))
            }
            (EventKind::Command, _) => self.format_command_event(event),
            (EventKind::CacheCleanup, _) => Some(self.colorize(
                &format!(
                    "♻ [{host}] {task}: invalidating {} cache entries{dry}",
                    event.invalidated.len()
                ),
                "yellow",
            )),
            (EventKind::Internal, _) => {
                if self.verbosity == ConsoleVerbosity::Verbose {
                    Some(format!("· [{host}] {}{dry}", event.message))
                } else {
                    None
                }
            }
        }
    }

    fn format_command_event(&self, event: &ProvisionEvent) -> Option<String> {
        let short = event.checksum.as_ref().map(|c| c.short()).unwrap_or("");
        match (event.status, event.phase) {
            (Some(ExecStatus::Cached), _) => {
                if self.verbosity == ConsoleVerbosity::Verbose {
                    Some(self.colorize(&format!("  = {short} {}", event.message), "cyan"))
                } else {
                    None
                }
            }
            (_, Phase::Planned) => {
                Some(self.colorize(&format!("  ~ {short} {}", event.message), "yellow"))
            }
            (_, Phase::Started) => Some(format!("  + {short} {}", event.message)),
            _ => None,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        let color_code = match color {
            "red" => "\x1b[31m",
            "green" => "\x1b[32m",
            "yellow" => "\x1b[33m",
            "blue" => "\x1b[34m",
            "cyan" => "\x1b[36m",
            _ => "\x1b[0m",
        };

        format!("{}{}\x1b[0m", color_code, text)
    }

    /// Progress goes to stderr; stdout is reserved for command results
    fn write_output(&self, content: &str) {
        eprintln!("{content}");
    }
}

impl Default for ConsoleSubscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSubscriber for ConsoleSubscriber {
    async fn handle_event(
        &self,
        event: &PublishedEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(formatted) = self.format_event(&event.event) {
            self.write_output(&formatted);
            debug!(kind = ?event.event.kind, "Console event output");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }

    fn is_interested(&self, event: &ProvisionEvent) -> bool {
        match self.verbosity {
            ConsoleVerbosity::Quiet => event.is_failure(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Checksum;

    fn command_event(status: ExecStatus, phase: Phase) -> ProvisionEvent {
        ProvisionEvent::new(EventKind::Command, phase, "web-1")
            .task("webserver")
            .command(Checksum::of("true"), "[COMMAND] # true")
            .status(status)
    }

    #[test]
    fn test_cached_commands_only_in_verbose() {
        let normal = ConsoleSubscriber::with_config(false, ConsoleVerbosity::Normal);
        let verbose = ConsoleSubscriber::with_config(false, ConsoleVerbosity::Verbose);
        let event = command_event(ExecStatus::Cached, Phase::Finished);

        assert!(normal.format_event(&event).is_none());
        let line = verbose.format_event(&event).unwrap();
        assert!(line.starts_with("  = "));
        assert!(line.ends_with("[COMMAND] # true"));
    }

    #[test]
    fn test_started_command_is_printed() {
        let subscriber = ConsoleSubscriber::with_config(false, ConsoleVerbosity::Normal);
        let line = subscriber
            .format_event(&command_event(ExecStatus::Started, Phase::Started))
            .unwrap();
        assert!(line.starts_with("  + "));
    }

    #[test]
    fn test_quiet_only_wants_failures() {
        let quiet = ConsoleSubscriber::with_config(false, ConsoleVerbosity::Quiet);
        let failed = ProvisionEvent::new(EventKind::Task, Phase::Failed, "web-1")
            .task("webserver")
            .error("boom");
        let started = ProvisionEvent::new(EventKind::Task, Phase::Started, "web-1");

        assert!(quiet.is_interested(&failed));
        assert!(!quiet.is_interested(&started));
        assert_eq!(
            quiet.format_event(&failed).unwrap(),
            "✗ [web-1] webserver: boom"
        );
    }

    #[test]
    fn test_colorize() {
        let color_subscriber = ConsoleSubscriber::with_config(true, ConsoleVerbosity::Normal);
        let no_color_subscriber = ConsoleSubscriber::with_config(false, ConsoleVerbosity::Normal);

        let colored = color_subscriber.colorize("text", "red");
        assert!(colored.contains("\x1b[31m"));
        assert!(colored.contains("\x1b[0m"));
        assert_eq!(no_color_subscriber.colorize("text", "red"), "text");
    }
}

//! Progress event definitions

use crate::types::Checksum;
use serde::{Deserialize, Serialize};

/// Message category of a progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A task as a whole
    Task,
    /// A single command of a task
    Command,
    /// Removal of stale completion markers
    CacheCleanup,
    /// Internal housekeeping such as bootstrap and directory creation
    Internal,
}

/// Where in its lifecycle the reported operation is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Started,
    Finished,
    Failed,
    /// Dry run: the operation would have happened
    Planned,
}

/// Execution status of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecStatus {
    Cached,
    Started,
    Finished,
}

/// A progress event published while provisioning a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionEvent {
    pub kind: EventKind,
    pub phase: Phase,
    /// Identifying name of the target
    pub hostname: String,
    pub task: Option<String>,
    pub checksum: Option<Checksum>,
    /// Human readable log line
    pub message: String,
    pub status: Option<ExecStatus>,
    pub error: Option<String>,
    /// Checksums whose markers are (or would be) removed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalidated: Vec<Checksum>,
    pub dry_run: bool,
}

impl ProvisionEvent {
    /// Create an event with no task or command attached
    pub fn new(kind: EventKind, phase: Phase, hostname: impl Into<String>) -> Self {
        Self {
            kind,
            phase,
            hostname: hostname.into(),
            task: None,
            checksum: None,
            message: String::new(),
            status: None,
            error: None,
            invalidated: Vec::new(),
            dry_run: false,
        }
    }

    #[must_use]
    pub fn task(mut self, name: impl Into<String>) -> Self {
        self.task = Some(name.into());
        self
    }

    /// Attach the command's checksum and its log line
    #[must_use]
    pub fn command(mut self, checksum: Checksum, log: impl Into<String>) -> Self {
        self.checksum = Some(checksum);
        self.message = log.into();
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn status(mut self, status: ExecStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }

    #[must_use]
    pub fn invalidated(mut self, checksums: Vec<Checksum>) -> Self {
        self.invalidated = checksums;
        self
    }

    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Whether this event reports a failure
    pub fn is_failure(&self) -> bool {
        self.phase == Phase::Failed || self.error.is_some()
    }
}

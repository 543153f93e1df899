//! Scripted transport for tests

use crate::{CommandOutput, Transport};
use async_trait::async_trait;
use groundwork_core::{Error, Result};
use parking_lot::Mutex;

/// Records every script and answers from a list of rules.
///
/// Rules match by substring and the first match wins. Scripts matching no
/// rule succeed with empty output.
#[derive(Debug, Default)]
pub struct MockTransport {
    rules: Mutex<Vec<(String, Reply)>>,
    scripts: Mutex<Vec<String>>,
}

#[derive(Debug, Clone)]
enum Reply {
    Output(CommandOutput),
    Unreachable(String),
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer scripts containing `pattern` with `output`
    pub fn respond(&self, pattern: impl Into<String>, output: CommandOutput) -> &Self {
        self.rules
            .lock()
            .push((pattern.into(), Reply::Output(output)));
        self
    }

    /// Fail the channel itself for scripts containing `pattern`
    pub fn unreachable(&self, pattern: impl Into<String>, message: impl Into<String>) -> &Self {
        self.rules
            .lock()
            .push((pattern.into(), Reply::Unreachable(message.into())));
        self
    }

    /// Scripts received so far, in order
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().clone()
    }

    /// Number of received scripts containing `pattern`
    pub fn count(&self, pattern: &str) -> usize {
        self.scripts
            .lock()
            .iter()
            .filter(|s| s.contains(pattern))
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn run(&self, script: &str) -> Result<CommandOutput> {
        self.scripts.lock().push(script.to_string());

        let reply = self
            .rules
            .lock()
            .iter()
            .find(|(pattern, _)| script.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::Unreachable(message)) => Err(Error::transport(self.describe(), message)),
            None => Ok(CommandOutput::success("")),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

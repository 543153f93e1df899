//! Run scripts on the local machine

use crate::{CommandOutput, Transport};
use async_trait::async_trait;
use groundwork_core::{Error, Result};
use tokio::process::Command;
use tracing::debug;

/// Runs scripts with `sh -c` on this machine
#[derive(Debug, Clone, Default)]
pub struct LocalTransport;

impl LocalTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn run(&self, script: &str) -> Result<CommandOutput> {
        debug!(script = %script, "Running local script");
        let output = Command::new("sh")
            .arg("-c")
            .arg(script)
            .output()
            .await
            .map_err(|e| Error::transport("localhost", format!("failed to spawn sh: {e}")))?;
        Ok(output.into())
    }

    fn describe(&self) -> String {
        "localhost".to_string()
    }
}

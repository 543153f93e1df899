//! Run scripts on a remote host through the system `ssh` client

use crate::{CommandOutput, Transport};
use async_trait::async_trait;
use groundwork_core::{Error, Result, DEFAULT_SSH_PORT, SUPERUSER};
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Exit status ssh reserves for its own failures
const SSH_ERROR_EXIT: i32 = 255;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// An ssh connection target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTransport {
    address: String,
    user: String,
    port: u16,
    identity_file: Option<PathBuf>,
    connect_timeout: u64,
}

impl SshTransport {
    pub fn new(address: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            user: user.into(),
            port: DEFAULT_SSH_PORT,
            identity_file: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_identity_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout = seconds;
        self
    }

    fn destination(&self) -> String {
        let user = if self.user.is_empty() {
            SUPERUSER
        } else {
            self.user.as_str()
        };
        format!("{user}@{}", self.address)
    }

    /// Arguments passed to `ssh` before the script
    pub fn ssh_args(&self) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            self.port.to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout),
        ];
        if let Some(key) = &self.identity_file {
            args.push("-i".to_string());
            args.push(key.display().to_string());
        }
        args.push(self.destination());
        args
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn run(&self, script: &str) -> Result<CommandOutput> {
        debug!(destination = %self.describe(), script = %script, "Running remote script");

        let output = Command::new("ssh")
            .args(self.ssh_args())
            .arg(script)
            .output()
            .await
            .map_err(|e| Error::transport(self.describe(), format!("failed to spawn ssh: {e}")))?;
        let output = CommandOutput::from(output);

        if output.exit_code == Some(SSH_ERROR_EXIT) {
            return Err(Error::transport(self.describe(), output.diagnostic()));
        }
        Ok(output)
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.destination(), self.port)
    }
}

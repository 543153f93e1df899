//! Execution channels for groundwork
//!
//! A [`Transport`] runs one shell script on the target and reports its exit
//! status and output. A non-zero exit status is not an error at this level;
//! callers decide what a failing script means. Errors are reserved for the
//! channel itself (spawn failures, unreachable hosts).

pub mod local;
pub mod mock;
pub mod ssh;

pub use local::LocalTransport;
pub use mock::MockTransport;
pub use ssh::SshTransport;

use async_trait::async_trait;
use groundwork_core::Result;

/// Exit status and captured output of a script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` if the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stderr if present, stdout otherwise; trimmed for messages
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// A channel able to run shell scripts on one target
#[async_trait]
pub trait Transport: Send + Sync {
    async fn run(&self, script: &str) -> Result<CommandOutput>;

    /// Target description for logs and errors
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let out = CommandOutput {
            exit_code: Some(1),
            stdout: "partial\n".into(),
            stderr: "  boom \n".into(),
        };
        assert_eq!(out.diagnostic(), "boom");
        assert_eq!(CommandOutput::success("ok\n").diagnostic(), "ok");
        assert!(!CommandOutput::failure(2, "").is_success());
    }
}

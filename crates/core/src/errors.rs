use std::path::PathBuf;

/// Result type alias for groundwork operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for groundwork operations
///
/// Every variant aborts the current task and the whole run. There is no
/// partial continuation; re-running the build is the retry mechanism.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The run cannot start: missing user, failed bootstrap
    #[error("precondition failed: {message}")]
    Precondition { message: String },

    /// A completion marker with a malformed checksum was found on the target
    #[error("invalid checksum {checksum:?} found for task {task:?}")]
    CacheTreeCorruption { task: String, checksum: String },

    /// Creating or preparing a task cache directory failed
    #[error("failed to prepare cache directory '{path}': {message}")]
    Directory { path: String, message: String },

    /// A command exited with failure on the target
    #[error("{}", format_execution_error(.task, .checksum, .exit_code, .message))]
    Execution {
        task: String,
        checksum: String,
        exit_code: Option<i32>,
        message: String,
    },

    /// Removing stale markers failed
    #[error("failed to clean up stale cache entries of task '{task}': {message}")]
    Cleanup { task: String, message: String },

    /// The remote channel itself failed (spawn error, connection refused)
    #[error("transport error for '{target}': {message}")]
    Transport { target: String, message: String },

    /// A command could not be constructed
    #[error("invalid command: {message}")]
    Command { message: String },

    /// A package could not be registered or compiled
    #[error("package '{name}': {message}")]
    Package { name: String, message: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

fn format_execution_error(
    task: &str,
    checksum: &str,
    exit_code: &Option<i32>,
    message: &str,
) -> String {
    let short = checksum.get(..12).unwrap_or(checksum);
    match exit_code {
        Some(code) => {
            format!("command {short} of task '{task}' failed with exit code {code}: {message}")
        }
        None => format!("command {short} of task '{task}' failed: {message}"),
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

impl Error {
    /// Create a precondition error
    #[must_use]
    pub fn precondition(message: impl Into<String>) -> Self {
        Error::Precondition {
            message: message.into(),
        }
    }

    /// Create a cache tree corruption error
    #[must_use]
    pub fn cache_tree_corruption(task: impl Into<String>, checksum: impl Into<String>) -> Self {
        Error::CacheTreeCorruption {
            task: task.into(),
            checksum: checksum.into(),
        }
    }

    /// Create a cache directory error
    #[must_use]
    pub fn directory(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Directory {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a command execution error
    #[must_use]
    pub fn execution(
        task: impl Into<String>,
        checksum: impl Into<String>,
        exit_code: Option<i32>,
        message: impl Into<String>,
    ) -> Self {
        Error::Execution {
            task: task.into(),
            checksum: checksum.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create a cleanup error
    #[must_use]
    pub fn cleanup(task: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Cleanup {
            task: task.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    #[must_use]
    pub fn transport(target: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Transport {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create an invalid command error
    #[must_use]
    pub fn command(message: impl Into<String>) -> Self {
        Error::Command {
            message: message.into(),
        }
    }

    /// Create a package registration error
    #[must_use]
    pub fn package(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Package {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }
}

// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to a Result
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a lazy message
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let base_error = e.into();
            Error::Configuration {
                message: format!("{}: {}", message.into(), base_error),
            }
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let base_error = e.into();
            Error::Configuration {
                message: format!("{}: {}", f(), base_error),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corruption_error_names_task_and_value() {
        let err = Error::cache_tree_corruption("webserver", "abc");
        let msg = err.to_string();
        assert!(msg.contains("webserver"));
        assert!(msg.contains("\"abc\""));
    }

    #[test]
    fn test_execution_error_display() {
        let checksum = "a".repeat(64);
        let err = Error::execution("db", &checksum, Some(2), "no such file");
        assert_eq!(
            err.to_string(),
            "command aaaaaaaaaaaa of task 'db' failed with exit code 2: no such file"
        );

        let err = Error::execution("db", "short", None, "killed");
        assert_eq!(err.to_string(), "command short of task 'db' failed: killed");
    }

    #[test]
    fn test_context_wraps_message() {
        let result: std::result::Result<(), Error> = Err(Error::command("empty test given"));
        let err = result.context("loading manifest").unwrap_err();
        assert!(err
            .to_string()
            .contains("loading manifest: invalid command: empty test given"));
    }
}

//! File writer for JSON log operations

use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// Append-only log file writer with buffering
pub struct LogWriter {
    writer: Mutex<Option<BufWriter<File>>>,
}

impl LogWriter {
    /// Open (or create) the log file in append mode
    pub async fn new<P: AsRef<Path>>(file_path: P) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)
            .await?;

        Ok(Self {
            writer: Mutex::new(Some(BufWriter::new(file))),
        })
    }

    /// Write one line to the log file
    pub async fn write_line(&self, content: &str) -> std::io::Result<usize> {
        let mut guard = self.writer.lock().await;
        match guard.as_mut() {
            Some(writer) => {
                writer.write_all(content.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
                Ok(content.len() + 1)
            }
            None => Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "log writer already closed",
            )),
        }
    }

    /// Flush and close the writer
    pub async fn close(&self) {
        if let Some(mut writer) = self.writer.lock().await.take() {
            if let Err(e) = writer.flush().await {
                tracing::warn!("Failed to flush log buffer during close: {}", e);
            }
        }
    }
}

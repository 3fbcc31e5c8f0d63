//! Rasterizer process client
//!
//! Drives the external rasterizer: document bytes on stdin, concatenated
//! raster frames on stdout. Anything on stderr, a non-zero exit, or
//! exceeding the configured wait bound fails the whole request; a missing
//! page set must never silently pass as an empty one.

use async_trait::async_trait;
use courier_common::{Error, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, document: &[u8]) -> Result<Vec<u8>>;
}

/// Rasterizer backed by a configured external command.
pub struct CommandRasterizer {
    command: Vec<String>,
    timeout: Duration,
}

impl CommandRasterizer {
    pub fn new(command: Vec<String>, timeout: Duration) -> Result<Self> {
        if command.is_empty() {
            return Err(Error::Config("rasterizer command is empty".to_string()));
        }
        Ok(Self { command, timeout })
    }
}

#[async_trait]
impl Rasterizer for CommandRasterizer {
    async fn rasterize(&self, document: &[u8]) -> Result<Vec<u8>> {
        tracing::debug!(
            command = %self.command[0],
            document_bytes = document.len(),
            "invoking rasterizer"
        );

        let mut child = Command::new(&self.command[0])
            .args(&self.command[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Rasterization(format!("spawn: {}", e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Rasterization("stdin unavailable".to_string()))?;
        // Feed stdin from its own task so a child that emits frames before
        // consuming the whole document cannot deadlock against us
        let payload = document.to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&payload).await;
            drop(stdin);
            result
        });

        // kill_on_drop reaps the child if the timeout wins
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                writer.abort();
                Error::Rasterization(format!("timed out after {:?}", self.timeout))
            })?
            .map_err(|e| Error::Rasterization(format!("wait: {}", e)))?;
        if let Ok(Err(e)) = writer.await {
            return Err(Error::Rasterization(format!("write: {}", e)));
        }

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Rasterization(format!(
                "diagnostic output: {}",
                stderr.trim()
            )));
        }
        if !output.status.success() {
            return Err(Error::Rasterization(format!(
                "exited with {:?}",
                output.status.code()
            )));
        }

        tracing::debug!(raster_bytes = output.stdout.len(), "rasterizer finished");
        Ok(output.stdout)
    }
}

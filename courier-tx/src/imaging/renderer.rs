//! Document renderer seam
//!
//! The renderer is an external collaborator: given a survey catalog and
//! the submission it yields a page-structured document. Only the document
//! bytes and the page count matter here; layout is the collaborator's
//! business. [`CommandRenderer`] drives a configured external command,
//! test code substitutes its own implementation of the trait.

use crate::rules::Catalog;
use async_trait::async_trait;
use courier_common::{Error, Result, Submission};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// A rendered document plus the renderer's page count, when it reports one.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub pages: Option<u32>,
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, catalog: &Catalog, submission: &Submission) -> Result<RenderedDocument>;
}

/// Renderer that spawns a configured command, writing the catalog and
/// submission as JSON to its stdin and reading the document from stdout.
pub struct CommandRenderer {
    command: Vec<String>,
}

impl CommandRenderer {
    pub fn new(command: Vec<String>) -> Result<Self> {
        if command.is_empty() {
            return Err(Error::Config("renderer command is empty".to_string()));
        }
        Ok(Self { command })
    }
}

#[async_trait]
impl DocumentRenderer for CommandRenderer {
    async fn render(&self, catalog: &Catalog, submission: &Submission) -> Result<RenderedDocument> {
        let input = serde_json::json!({
            "catalog": catalog,
            "submission": submission,
        });
        let payload = serde_json::to_vec(&input)
            .map_err(|e| Error::Internal(format!("renderer input: {}", e)))?;

        tracing::debug!(command = %self.command[0], "rendering document");

        let mut child = Command::new(&self.command[0])
            .args(&self.command[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Internal(format!("renderer spawn: {}", e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Internal("renderer stdin unavailable".to_string()))?;
        // Feed stdin from its own task so a child that writes before it has
        // read everything cannot deadlock against us
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&payload).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::Internal(format!("renderer wait: {}", e)))?;
        if let Ok(Err(e)) = writer.await {
            return Err(Error::Internal(format!("renderer stdin: {}", e)));
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Internal(format!(
                "renderer exited with {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        Ok(RenderedDocument {
            bytes: output.stdout,
            pages: None,
        })
    }
}

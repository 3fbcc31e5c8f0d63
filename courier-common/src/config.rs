//! Configuration loading
//!
//! Resolution priority, highest first:
//! 1. Explicit file named by the `COURIER_CONFIG` environment variable
//! 2. Platform config file (`<config dir>/courier/config.toml`)
//! 3. Compiled defaults
//!
//! A missing config file is a warning and falls through to the defaults;
//! only an unreadable or malformed file is an error. Individual environment
//! overrides (`COURIER_BIND`, `COURIER_SEQUENCER_URL`) are applied last.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Archive entry path roots, stable within one deployment.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArchivePaths {
    pub data: String,
    pub receipts: String,
    pub images: String,
    pub index: String,
    pub response: String,
}

impl Default for ArchivePaths {
    fn default() -> Self {
        Self {
            data: "EDC_QData".to_string(),
            receipts: "EDC_QReceipts".to_string(),
            images: "EDC_QImages/Images".to_string(),
            index: "EDC_QImages/Index".to_string(),
            response: "EDC_QJson".to_string(),
        }
    }
}

/// Service configuration for the transform pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TxConfig {
    /// Bind address for the HTTP surface
    pub bind_addr: String,

    /// External document renderer: command plus arguments; the submission
    /// JSON is written to its stdin, the rendered document read from stdout
    pub renderer_command: Vec<String>,

    /// External rasterizer: command plus arguments; document bytes on
    /// stdin, concatenated raster frames on stdout
    pub rasterizer_command: Vec<String>,

    /// Upper bound on waiting for the rasterizer child process
    pub rasterizer_timeout_ms: u64,

    /// Sequencing collaborator base URL. Absent means image sequence
    /// numbers are derived from the transaction id instead.
    pub sequencer_url: Option<String>,

    /// Bounded retry count for sequencing lookups
    pub sequencer_retries: u32,

    /// Initial backoff between sequencing retries (doubles per attempt)
    pub sequencer_backoff_ms: u64,

    pub paths: ArchivePaths,
}

impl Default for TxConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5727".to_string(),
            renderer_command: vec!["courier-render".to_string()],
            rasterizer_command: vec![
                "pdftoppm".to_string(),
                "-r".to_string(),
                "100".to_string(),
            ],
            rasterizer_timeout_ms: 30_000,
            sequencer_url: None,
            sequencer_retries: 5,
            sequencer_backoff_ms: 100,
            paths: ArchivePaths::default(),
        }
    }
}

impl TxConfig {
    /// Load configuration following the documented priority order.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                tracing::warn!(path = %path.display(), "No config file found, using defaults");
                Self::default()
            }
            None => {
                tracing::warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        };

        if let Ok(bind) = std::env::var("COURIER_BIND") {
            config.bind_addr = bind;
        }
        if let Ok(url) = std::env::var("COURIER_SEQUENCER_URL") {
            if url.is_empty() {
                config.sequencer_url = None;
            } else {
                config.sequencer_url = Some(url);
            }
        }

        Ok(config)
    }

    /// Parse configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    fn config_file_path() -> Option<PathBuf> {
        if let Ok(explicit) = std::env::var("COURIER_CONFIG") {
            return Some(PathBuf::from(explicit));
        }
        dirs::config_dir().map(|d| d.join("courier").join("config.toml"))
    }

    pub fn rasterizer_timeout(&self) -> Duration {
        Duration::from_millis(self.rasterizer_timeout_ms)
    }

    pub fn sequencer_backoff(&self) -> Duration {
        Duration::from_millis(self.sequencer_backoff_ms)
    }
}

//! courier-tx library interface
//!
//! Exposes the transform pipeline and its pieces for the binary and for
//! integration testing.

pub mod api;
pub mod archive;
pub mod error;
pub mod imaging;
pub mod pipeline;
pub mod rules;
pub mod serialize;
pub mod transform;

pub use crate::api::build_router;
pub use crate::error::{ApiError, ApiResult};
pub use crate::pipeline::{Processor, TransformedPackage};

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The request-scoped transform pipeline
    pub processor: Arc<Processor>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(processor: Processor) -> Self {
        Self {
            processor: Arc::new(processor),
            startup_time: Utc::now(),
        }
    }
}

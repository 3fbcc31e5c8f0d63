//! # Courier Common Library
//!
//! Shared code for the courier transform service including:
//! - Error taxonomy (`Error` enum)
//! - Inbound submission model
//! - Identifier resolution
//! - Timestamp and reporting-period parsing
//! - Configuration loading

pub mod config;
pub mod error;
pub mod identifiers;
pub mod submission;
pub mod time;

pub use error::{Error, Result};
pub use identifiers::Identifiers;
pub use submission::{RawAnswers, Submission};

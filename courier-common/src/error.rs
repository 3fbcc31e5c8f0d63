//! Common error types for courier

use thiserror::Error;

/// Common result type for courier operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared across the courier workspace.
///
/// Resolver, catalog-lookup, rasterizer and sequencing failures each carry
/// their own variant so the API layer can map them to distinct responses.
/// Value-coercion failures inside the rule engine and serializers are
/// absorbed locally and never appear here.
#[derive(Error, Debug)]
pub enum Error {
    /// One or more required identifier fields absent or unparsable.
    /// The message names every missing field.
    #[error("Missing identifier(s): {0}")]
    MissingIdentifier(String),

    /// Survey id has no registered transform table or catalog
    #[error("Unknown survey: {0}")]
    UnknownSurvey(String),

    /// Survey is known but the instrument id is not registered for it
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    /// External rasterizer failed, produced diagnostics, or returned an
    /// unframeable byte stream
    #[error("Rasterization failed: {0}")]
    Rasterization(String),

    /// Sequencing collaborator unreachable after bounded retries
    #[error("Sequencing failed: {0}")]
    Sequencing(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for failures the caller caused (bad submission), as opposed to
    /// pipeline failures on our side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingIdentifier(_) | Error::UnknownSurvey(_) | Error::UnknownInstrument(_)
        )
    }
}

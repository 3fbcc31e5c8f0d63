//! Error types for courier-tx

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use courier_common::Error;
use serde_json::json;
use thiserror::Error as ThisError;

/// API error type wrapping the workspace taxonomy for the HTTP boundary.
#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Pipeline(err) => {
                let code = match &err {
                    Error::MissingIdentifier(_) => "MISSING_IDENTIFIER",
                    Error::UnknownSurvey(_) => "UNKNOWN_SURVEY",
                    Error::UnknownInstrument(_) => "UNKNOWN_INSTRUMENT",
                    Error::Rasterization(_) => "RASTERIZATION_FAILED",
                    Error::Sequencing(_) => "SEQUENCING_FAILED",
                    Error::Io(_) => "IO_ERROR",
                    Error::Config(_) => "CONFIG_ERROR",
                    Error::Internal(_) => "INTERNAL_ERROR",
                };
                let status = if err.is_client_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, code, err.to_string())
            }
            ApiError::Other(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

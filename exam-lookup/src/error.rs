//! Error types for exam-lookup
//!
//! Every variant is recovered at the component boundary and turned into a
//! user-facing message, except [`LookupError::NoCohorts`] which stops startup.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::vocab;

/// Lookup, update, and load errors
#[derive(Debug, Error)]
pub enum LookupError {
    /// Query is not numeric, or its leading digit has no routing entry
    #[error("Unroutable identifier: '{0}'")]
    UnroutableIdentifier(String),

    /// No record matches within the resolved scope
    #[error("Not found: {0}")]
    NotFound(String),

    /// Cohort key outside the configured set
    #[error("Unknown cohort: {0}")]
    UnknownCohort(String),

    /// Update secret mismatch (or updates disabled)
    #[error("Unauthorized update attempt")]
    Unauthorized,

    /// A backing file failed to parse
    #[error("Malformed source {path}: {reason}")]
    MalformedSource { path: String, reason: String },

    /// No cohort could be loaded at startup
    #[error("No cohort source could be loaded")]
    NoCohorts,

    /// File I/O failure while persisting an update
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using LookupError
pub type Result<T> = std::result::Result<T, LookupError>;

impl LookupError {
    /// Message shown to the requester
    pub fn user_message(&self) -> String {
        match self {
            LookupError::UnroutableIdentifier(_) => vocab::UNROUTABLE.to_string(),
            LookupError::NotFound(_) => vocab::ID_NOT_FOUND.to_string(),
            LookupError::UnknownCohort(_) => vocab::UNKNOWN_COHORT.to_string(),
            LookupError::Unauthorized => vocab::UNAUTHORIZED.to_string(),
            LookupError::MalformedSource { reason, .. } => {
                format!("{}: {}", vocab::MALFORMED_SOURCE, reason)
            }
            LookupError::NoCohorts | LookupError::Io(_) => vocab::INTERNAL_ERROR.to_string(),
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            LookupError::UnroutableIdentifier(_) => (StatusCode::BAD_REQUEST, "UNROUTABLE_IDENTIFIER"),
            LookupError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            LookupError::UnknownCohort(_) => (StatusCode::NOT_FOUND, "UNKNOWN_COHORT"),
            LookupError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            LookupError::MalformedSource { .. } => (StatusCode::BAD_REQUEST, "MALFORMED_SOURCE"),
            LookupError::NoCohorts => (StatusCode::SERVICE_UNAVAILABLE, "NO_COHORTS"),
            LookupError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let body = Json(json!({
            "error": error_code,
            "message": self.user_message(),
            "detail": self.to_string(),
        }));

        (status, body).into_response()
    }
}

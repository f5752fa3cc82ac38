/// Error types for the interviewer
///
/// Every pipeline failure surfaces as one of these variants so callers can tell
/// the kinds apart. At the HTTP boundary they collapse into a not-found class,
/// a bad-request class and a generic failure class.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterviewError {
    /// Candidate record, interview script or other keyed document absent
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Generated output failed structural validation
    #[error("Generated {what} has an invalid shape: {reason}")]
    GenerationShape { what: &'static str, reason: String },

    #[error("Text generation did not finish within {0:?}")]
    GenerationTimeout(Duration),

    /// The upstream text-generation call itself failed
    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("No interactions recorded for candidate {0}")]
    NoInteractions(String),

    #[error("Store operation failed: {0}")]
    Store(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, InterviewError>;

impl InterviewError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        InterviewError::NotFound { kind, id: id.into() }
    }

    pub fn shape(what: &'static str, reason: impl Into<String>) -> Self {
        InterviewError::GenerationShape {
            what,
            reason: reason.into(),
        }
    }
}

impl ResponseError for InterviewError {
    fn status_code(&self) -> StatusCode {
        match self {
            InterviewError::NotFound { .. } | InterviewError::NoInteractions(_) => {
                StatusCode::NOT_FOUND
            }
            InterviewError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<tokio_postgres::Error> for InterviewError {
    fn from(err: tokio_postgres::Error) -> Self {
        InterviewError::Store(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for InterviewError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        InterviewError::Store(format!("Connection failed: {}", err))
    }
}

impl From<config::ConfigError> for InterviewError {
    fn from(err: config::ConfigError) -> Self {
        InterviewError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for InterviewError {
    fn from(err: validator::ValidationErrors) -> Self {
        InterviewError::Validation(err.to_string())
    }
}

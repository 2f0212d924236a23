//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, ErrorKind};

/// Application errors wrap domain errors and add request-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    #[error("config error: {message}")]
    Config { message: String },
}

impl ApplicationError {
    /// HTTP-style status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            ApplicationError::Domain(e) => match e.kind() {
                ErrorKind::Validation => 400,
                ErrorKind::NotFound => 404,
                ErrorKind::Internal => 500,
            },
            ApplicationError::InvalidBody(_) | ApplicationError::InvalidRequest(_) => 400,
            ApplicationError::RouteNotFound { .. } => 404,
            ApplicationError::Config { .. } => 500,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

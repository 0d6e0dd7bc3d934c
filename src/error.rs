use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Request-level errors surfaced over HTTP
///
/// The resolve operations never produce these; only request validation does.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Which offline table a lookup or load refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Personal,
    Default,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Personal => write!(f, "personal"),
            TableKind::Default => write!(f, "default"),
        }
    }
}

/// Unexpected failure of an offline lookup
///
/// A user missing from the personal table is not one of these: that case
/// falls back to the default list.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("{0} recommendations table is not loaded")]
    TableNotLoaded(TableKind),
}

/// External collaborator consulted by the online branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    Events,
    Features,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collaborator::Events => write!(f, "events"),
            Collaborator::Features => write!(f, "features"),
        }
    }
}

/// Failure of a single collaborator call
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("{collaborator} store returned status {status}")]
    Status { collaborator: Collaborator, status: u16 },

    #[error("{collaborator} store timed out")]
    Timeout { collaborator: Collaborator },

    #[error("{collaborator} store request failed: {message}")]
    Transport {
        collaborator: Collaborator,
        message: String,
    },

    #[error("{collaborator} store response could not be decoded: {message}")]
    Decode {
        collaborator: Collaborator,
        message: String,
    },
}

impl UpstreamError {
    pub fn collaborator(&self) -> Collaborator {
        match self {
            UpstreamError::Status { collaborator, .. }
            | UpstreamError::Timeout { collaborator }
            | UpstreamError::Transport { collaborator, .. }
            | UpstreamError::Decode { collaborator, .. } => *collaborator,
        }
    }

    /// Classifies a reqwest failure for the given collaborator
    pub fn from_reqwest(collaborator: Collaborator, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout { collaborator }
        } else if err.is_decode() {
            UpstreamError::Decode {
                collaborator,
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            UpstreamError::Status {
                collaborator,
                status: status.as_u16(),
            }
        } else {
            UpstreamError::Transport {
                collaborator,
                message: err.to_string(),
            }
        }
    }
}

/// Startup-time failures while reading tabular inputs
#[derive(thiserror::Error, Debug)]
pub enum DataLoadError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

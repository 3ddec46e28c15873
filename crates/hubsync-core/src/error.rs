//! Reconciliation error types

use thiserror::Error;

use crate::approval::ApprovalStatus;

/// Errors surfaced by a reconciliation run
///
/// Every variant aborts the run. Remote changes that were already committed
/// (e.g. the delete half of an overwrite) are not rolled back.
#[derive(Error, Debug)]
pub enum HubError {
    #[error(
        "If state is present, a version must be supplied through the path or the version parameter"
    )]
    MissingVersion,

    #[error("Could not find Collection {namespace}.{name} in path {path}")]
    ArtifactFileMissing {
        namespace: String,
        name: String,
        path: String,
    },

    #[error("Could not find Collection {namespace}.{name}{}", version_suffix(.version))]
    NotFound {
        namespace: String,
        name: String,
        version: Option<String>,
    },

    #[error("{}", transport_message(.status, .message))]
    Transport { status: Option<u16>, message: String },

    #[error("Timed out after {timeout:?} waiting for approval of {endpoint}")]
    ApprovalTimeout {
        endpoint: String,
        timeout: std::time::Duration,
    },

    #[error("Approval of {endpoint} ended with status {status}")]
    ApprovalFailed {
        endpoint: String,
        status: ApprovalStatus,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HubError {
    /// Transport failure without an HTTP status (connection, TLS, decoding)
    pub fn transport(message: impl Into<String>) -> Self {
        HubError::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Transport failure carrying the HTTP status the server answered with
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        HubError::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    /// True for the 404 case, which lookups translate into "absent"
    pub fn is_not_found_status(&self) -> bool {
        matches!(self, HubError::Transport { status: Some(404), .. })
    }
}

fn version_suffix(version: &Option<String>) -> String {
    match version {
        Some(v) => format!(" with_version {}", v),
        None => String::new(),
    }
}

fn transport_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Request failed with status {}: {}", code, message),
        None => format!("Request failed: {}", message),
    }
}

pub type Result<T> = std::result::Result<T, HubError>;

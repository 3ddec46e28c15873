//! HTTP client error types

use hubsync_core::HubError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response from {url}: {message}")]
    UnexpectedResponse { url: String, message: String },

    #[error("Import of {item_type} failed: {message}")]
    ImportFailed { item_type: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<HttpError> for HubError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, message } => HubError::http_status(status, message),
            HttpError::Request(e) => match e.status() {
                Some(status) => HubError::http_status(status.as_u16(), e.to_string()),
                None => HubError::transport(e.to_string()),
            },
            HttpError::Io(e) => HubError::Io(e),
            other => HubError::transport(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, HttpError>;

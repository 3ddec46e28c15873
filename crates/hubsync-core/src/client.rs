//! API client capability the reconciler depends on
//!
//! The transport (HTTP, authentication, retries) lives behind [`HubClient`];
//! the core only sees structured responses and typed errors.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP method understood by the client collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Patch => write!(f, "PATCH"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// What a request should do when the server answers 404
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMissing {
    /// Return `Ok(None)`
    Absent,
    /// Return a transport error
    Fail,
}

/// Structured response of a successful request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    pub json: serde_json::Value,
}

impl ApiResponse {
    pub fn new(status: u16, json: serde_json::Value) -> Self {
        Self { status, json }
    }
}

/// Response of a delete call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub href: Option<String>,
    pub task: Option<serde_json::Value>,
}

impl DeleteResponse {
    /// Pick `href` and `task` out of a delete response body
    pub fn from_json(json: &serde_json::Value) -> Self {
        Self {
            href: json.get("href").and_then(|v| v.as_str()).map(str::to_string),
            task: json.get("task").filter(|v| !v.is_null()).cloned(),
        }
    }
}

/// Remote API capability
///
/// Implementations must map a 404 to `Ok(None)` when asked for
/// [`OnMissing::Absent`] and surface every other non-success status as
/// [`crate::HubError::Transport`].
#[async_trait]
pub trait HubClient: Send + Sync {
    /// Version string reported by the server
    async fn server_version(&self) -> Result<String>;

    /// Issue a request against an API endpoint
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
        on_missing: OnMissing,
    ) -> Result<Option<ApiResponse>>;

    /// GET an endpoint, treating 404 as absent
    async fn get(&self, endpoint: &str) -> Result<Option<ApiResponse>> {
        self.request(Method::Get, endpoint, None, OnMissing::Absent)
            .await
    }

    /// Delete the resource addressed by `href`
    async fn delete(&self, href: &str) -> Result<DeleteResponse>;

    /// Upload an artifact file below `endpoint_prefix`
    ///
    /// With `wait` the call returns only once the server finished importing.
    async fn upload(
        &self,
        path: &Path,
        endpoint_prefix: &str,
        wait: bool,
        item_type: &str,
    ) -> Result<()>;
}

//! Automation Hub API client
//!
//! Implements [`HubClient`] over reqwest. Endpoints are resolved against
//! `{host}/api/galaxy/`:
//!
//! - `https://…` is used as-is
//! - `/api/…` (server-provided `href`s) is joined to the host
//! - `v3/…` is joined to the API root
//! - anything else is relative to `{host}/api/galaxy/v3/`

use crate::error::{HttpError, Result};
use async_trait::async_trait;
use hubsync_core::{ApiResponse, DeleteResponse, HubClient, Method, OnMissing};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const API_ROOT: &str = "/api/galaxy/";
const API_V3: &str = "/api/galaxy/v3/";
const ARTIFACT_MIME: &str = "application/gzip";
const USER_AGENT: &str = concat!("hubsync/", env!("CARGO_PKG_VERSION"));

/// How requests authenticate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Token(String),
    Basic { username: String, password: String },
    Anonymous,
}

/// Connection settings for [`HttpHubClient`]
#[derive(Debug, Clone)]
pub struct HubConnection {
    pub host: String,
    pub auth: Auth,
    pub validate_certs: bool,
    pub request_timeout: Duration,
    /// Delay between import task polls when uploading with `wait`
    pub import_poll_interval: Duration,
}

impl HubConnection {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            auth: Auth::Anonymous,
            validate_certs: true,
            request_timeout: Duration::from_secs(30),
            import_poll_interval: Duration::from_secs(2),
        }
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }
}

/// reqwest-backed [`HubClient`]
pub struct HttpHubClient {
    client: reqwest::Client,
    host: String,
    auth: Auth,
    import_poll_interval: Duration,
}

impl HttpHubClient {
    pub fn new(connection: HubConnection) -> Result<Self> {
        let host = normalize_host(&connection.host)?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(connection.request_timeout)
            .danger_accept_invalid_certs(!connection.validate_certs)
            .build()?;

        Ok(Self {
            client,
            host,
            auth: connection.auth,
            import_poll_interval: connection.import_poll_interval,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Absolute URL for an endpoint, always with a trailing slash
    pub fn resolve_url(&self, endpoint: &str) -> String {
        let mut url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else if endpoint.starts_with('/') {
            format!("{}{}", self.host, endpoint)
        } else if endpoint.starts_with("v3/") {
            format!("{}{}{}", self.host, API_ROOT, endpoint)
        } else {
            format!("{}{}{}", self.host, API_V3, endpoint)
        };

        if !url.ends_with('/') {
            url.push('/');
        }
        url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::Token(token) => request.header("Authorization", format!("Token {}", token)),
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
            Auth::Anonymous => request,
        }
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
        on_missing: OnMissing,
    ) -> Result<Option<ApiResponse>> {
        let url = self.resolve_url(endpoint);
        tracing::debug!("{} {}", method, url);

        let mut request = self.authorize(self.client.request(to_reqwest(method), &url));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND && on_missing == OnMissing::Absent {
            tracing::debug!("{} not found, treating as absent", url);
            return Ok(None);
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                message: error_message(&text, status),
            });
        }

        Ok(Some(ApiResponse::new(status.as_u16(), parse_body(&text))))
    }

    /// Poll an import task until it completes or fails
    async fn wait_for_task(&self, task: &str, item_type: &str) -> Result<()> {
        loop {
            let response = self
                .execute(Method::Get, task, None, OnMissing::Fail)
                .await?
                .ok_or_else(|| HttpError::UnexpectedResponse {
                    url: self.resolve_url(task),
                    message: "empty task response".to_string(),
                })?;

            let task_state: TaskState = serde_json::from_value(response.json).map_err(|e| {
                HttpError::UnexpectedResponse {
                    url: self.resolve_url(task),
                    message: e.to_string(),
                }
            })?;

            match task_state.state.as_str() {
                "completed" => {
                    tracing::info!("Import of {} finished", item_type);
                    return Ok(());
                }
                "failed" => {
                    let message = task_state
                        .error
                        .and_then(|e| e.description)
                        .unwrap_or_else(|| "no error description".to_string());
                    return Err(HttpError::ImportFailed {
                        item_type: item_type.to_string(),
                        message,
                    });
                }
                other => {
                    tracing::debug!("Import task {} is {}", task, other);
                    tokio::time::sleep(self.import_poll_interval).await;
                }
            }
        }
    }

    async fn upload_artifact(
        &self,
        path: &Path,
        endpoint_prefix: &str,
        wait: bool,
        item_type: &str,
    ) -> Result<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                HttpError::InvalidConfig(format!("not a file path: {}", path.display()))
            })?;
        let bytes = tokio::fs::read(path).await?;

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(ARTIFACT_MIME)?;
        let form = Form::new().part("file", part);

        let url = self.resolve_url(endpoint_prefix);
        tracing::debug!("POST {} (multipart {})", url, path.display());

        let response = self
            .authorize(self.client.post(&url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                message: error_message(&text, status),
            });
        }

        if !wait {
            return Ok(());
        }

        let body = parse_body(&text);
        let task = body
            .get("task")
            .and_then(|t| t.as_str())
            .ok_or_else(|| HttpError::UnexpectedResponse {
                url: url.clone(),
                message: "upload response carries no task".to_string(),
            })?;

        self.wait_for_task(task, item_type).await
    }
}

#[async_trait]
impl HubClient for HttpHubClient {
    async fn server_version(&self) -> hubsync_core::Result<String> {
        let response = self
            .execute(Method::Get, API_ROOT, None, OnMissing::Fail)
            .await?
            .ok_or_else(|| hubsync_core::HubError::transport("empty API root response"))?;

        let info: ApiRootInfo = serde_json::from_value(response.json)?;
        info.galaxy_ng_version
            .or(info.server_version)
            .ok_or_else(|| hubsync_core::HubError::transport("server did not report a version"))
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
        on_missing: OnMissing,
    ) -> hubsync_core::Result<Option<ApiResponse>> {
        Ok(self.execute(method, endpoint, body, on_missing).await?)
    }

    async fn delete(&self, href: &str) -> hubsync_core::Result<DeleteResponse> {
        let response = self
            .execute(Method::Delete, href, None, OnMissing::Fail)
            .await?;
        Ok(response
            .map(|r| DeleteResponse::from_json(&r.json))
            .unwrap_or_default())
    }

    async fn upload(
        &self,
        path: &Path,
        endpoint_prefix: &str,
        wait: bool,
        item_type: &str,
    ) -> hubsync_core::Result<()> {
        Ok(self
            .upload_artifact(path, endpoint_prefix, wait, item_type)
            .await?)
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ApiRootInfo {
    #[serde(default)]
    galaxy_ng_version: Option<String>,
    #[serde(default)]
    server_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskState {
    state: String,
    #[serde(default)]
    error: Option<TaskError>,
}

#[derive(Debug, Deserialize)]
struct TaskError {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Empty or non-JSON bodies become `null`
fn parse_body(text: &str) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(text).unwrap_or(serde_json::Value::Null)
}

/// Best human readable message out of an error body
fn error_message(text: &str, status: StatusCode) -> String {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(text) {
        if let Some(entry) = body.errors.first()
            && let Some(message) = entry.detail.clone().or_else(|| entry.title.clone())
        {
            return message;
        }
        if let Some(detail) = body.detail {
            return detail;
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

fn normalize_host(host: &str) -> Result<String> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(HttpError::InvalidConfig("host must not be empty".to_string()));
    }
    if host.starts_with("http://") || host.starts_with("https://") {
        Ok(host.to_string())
    } else {
        Ok(format!("https://{}", host))
    }
}

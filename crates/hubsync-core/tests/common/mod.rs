use async_trait::async_trait;
use hubsync_core::{
    ApiResponse, Clock, DeleteResponse, HubClient, HubError, Method, OnMissing, Result,
};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Remote call recorded by [`MockHubClient`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ServerVersion,
    Request { method: Method, endpoint: String },
    Delete(String),
    Upload { path: PathBuf, prefix: String, wait: bool },
}

/// In-memory hub: endpoints map to JSON payloads
pub struct MockHubClient {
    server_version: String,
    resources: Mutex<HashMap<String, Value>>,
    scripted: Mutex<HashMap<String, VecDeque<Option<Value>>>>,
    failures: Mutex<HashMap<String, u16>>,
    on_upload: Mutex<Vec<(String, Value)>>,
    fail_upload: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl MockHubClient {
    pub fn new(server_version: &str) -> Self {
        Self {
            server_version: server_version.to_string(),
            resources: Mutex::new(HashMap::new()),
            scripted: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            on_upload: Mutex::new(Vec::new()),
            fail_upload: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Register an existing resource; `href` is set from the endpoint if missing
    pub fn with_resource(self, endpoint: &str, mut json: Value) -> Self {
        if json.get("href").is_none() {
            json["href"] = json!(format!("/api/galaxy/v3/{}/", endpoint.trim_end_matches('/')));
        }
        self.resources
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), json);
        self
    }

    /// Responses returned by successive GETs before falling back to resources
    pub fn with_script(self, endpoint: &str, responses: Vec<Option<Value>>) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), responses.into());
        self
    }

    pub fn with_failure(self, endpoint: &str, status: u16) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), status);
        self
    }

    /// Resource that appears once an upload happened
    pub fn creates_on_upload(self, endpoint: &str, json: Value) -> Self {
        self.on_upload
            .lock()
            .unwrap()
            .push((endpoint.to_string(), json));
        self
    }

    pub fn failing_upload(self) -> Self {
        *self.fail_upload.lock().unwrap() = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that change remote state
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Delete(_) | Call::Upload { .. }))
            .collect()
    }

    pub fn gets_of(&self, endpoint: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| {
                matches!(c, Call::Request { method: Method::Get, endpoint: e } if e == endpoint)
            })
            .count()
    }

    pub fn has_resource(&self, endpoint: &str) -> bool {
        self.resources.lock().unwrap().contains_key(endpoint)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl HubClient for MockHubClient {
    async fn server_version(&self) -> Result<String> {
        self.record(Call::ServerVersion);
        Ok(self.server_version.clone())
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        _body: Option<&Value>,
        on_missing: OnMissing,
    ) -> Result<Option<ApiResponse>> {
        self.record(Call::Request {
            method,
            endpoint: endpoint.to_string(),
        });

        if let Some(status) = self.failures.lock().unwrap().get(endpoint) {
            return Err(HubError::http_status(*status, "scripted failure"));
        }

        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(endpoint)
            .and_then(|queue| queue.pop_front());

        let found = match scripted {
            Some(response) => response,
            None => self.resources.lock().unwrap().get(endpoint).cloned(),
        };

        match (found, on_missing) {
            (Some(json), _) => Ok(Some(ApiResponse::new(200, json))),
            (None, OnMissing::Absent) => Ok(None),
            (None, OnMissing::Fail) => Err(HubError::http_status(404, "Not found.")),
        }
    }

    async fn delete(&self, href: &str) -> Result<DeleteResponse> {
        self.record(Call::Delete(href.to_string()));

        let mut resources = self.resources.lock().unwrap();
        let before = resources.len();
        resources.retain(|_, json| json.get("href").and_then(|h| h.as_str()) != Some(href));
        if resources.len() == before {
            return Err(HubError::http_status(404, "Not found."));
        }

        Ok(DeleteResponse {
            href: Some(href.to_string()),
            task: Some(json!("/api/galaxy/v3/tasks/0001/")),
        })
    }

    async fn upload(
        &self,
        path: &Path,
        endpoint_prefix: &str,
        wait: bool,
        _item_type: &str,
    ) -> Result<()> {
        self.record(Call::Upload {
            path: path.to_path_buf(),
            prefix: endpoint_prefix.to_string(),
            wait,
        });

        if *self.fail_upload.lock().unwrap() {
            return Err(HubError::http_status(500, "import failed"));
        }

        let created = self.on_upload.lock().unwrap().clone();
        let mut resources = self.resources.lock().unwrap();
        for (endpoint, json) in created {
            resources.insert(endpoint, json);
        }
        Ok(())
    }
}

/// Virtual clock: `sleep` advances time instantly
pub struct ManualClock {
    base: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.elapsed.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Artifact file on disk named after the collection
#[allow(dead_code)]
pub struct Artifact {
    _dir: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl Artifact {
    pub fn new(namespace: &str, name: &str, version: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir
            .path()
            .join(format!("{}-{}-{}.tar.gz", namespace, name, version));
        std::fs::write(&path, b"not really a tarball").unwrap();
        Self { _dir: dir, path }
    }
}

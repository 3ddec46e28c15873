//! Desired state of a single collection

use crate::error::{HubError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REPOSITORY: &str = "published";
pub const DEFAULT_INTERVAL_SECS: f64 = 10.0;

/// Whether the collection should exist on the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    #[default]
    Present,
    Absent,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Present => write!(f, "present"),
            State::Absent => write!(f, "absent"),
        }
    }
}

impl std::str::FromStr for State {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "present" => Ok(State::Present),
            "absent" => Ok(State::Absent),
            other => Err(HubError::InvalidInput(format!(
                "state must be one of present, absent (got {})",
                other
            ))),
        }
    }
}

/// Declarative description of one collection (version)
///
/// Absent without a version targets every version of `namespace.name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredState {
    pub namespace: String,
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    /// Artifact to publish, named `<namespace>-<name>-<version>.tar.gz`
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_repository")]
    pub repository: String,

    #[serde(default = "default_true")]
    pub auto_approve: bool,

    #[serde(default)]
    pub overwrite_existing: bool,

    /// Wait for the server-side import of an upload
    #[serde(default = "default_true")]
    pub wait: bool,

    /// Seconds between approval probes
    #[serde(default = "default_interval")]
    pub interval: f64,

    /// Approval deadline in seconds; unbounded when unset
    #[serde(default)]
    pub timeout: Option<u64>,

    #[serde(default)]
    pub state: State,
}

fn default_repository() -> String {
    DEFAULT_REPOSITORY.to_string()
}

fn default_true() -> bool {
    true
}

fn default_interval() -> f64 {
    DEFAULT_INTERVAL_SECS
}

impl DesiredState {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            version: None,
            path: None,
            repository: default_repository(),
            auto_approve: true,
            overwrite_existing: false,
            wait: true,
            interval: DEFAULT_INTERVAL_SECS,
            timeout: None,
            state: State::Present,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    pub fn is_present(&self) -> bool {
        self.state == State::Present
    }

    /// Explicit version, ignoring an empty string
    pub fn explicit_version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.is_empty())
    }

    /// Fails for intervals that are not positive or do not fit a `Duration`
    pub fn interval_duration(&self) -> Result<Duration> {
        if self.interval <= 0.0 {
            return Err(invalid_interval(self.interval));
        }
        Duration::try_from_secs_f64(self.interval).map_err(|_| invalid_interval(self.interval))
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Reject values the option schema does not allow
    pub fn validate(&self) -> Result<()> {
        validate_identifier("namespace", &self.namespace)?;
        validate_identifier("name", &self.name)?;

        self.interval_duration()?;

        if self.repository.is_empty() {
            return Err(HubError::InvalidInput(
                "repository must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn invalid_interval(interval: f64) -> HubError {
    HubError::InvalidInput(format!(
        "interval must be a positive number of seconds (got {})",
        interval
    ))
}

/// Lower-case alphanumerics and underscores only
fn validate_identifier(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(HubError::InvalidInput(format!("{} is required", field)));
    }

    for c in value.chars() {
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
            return Err(HubError::InvalidInput(format!(
                "Invalid character '{}' in {}: {}",
                c, field, value
            )));
        }
    }

    Ok(())
}

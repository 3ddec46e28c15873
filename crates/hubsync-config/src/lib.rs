//! Connection settings for hubsync.
//!
//! Values are layered: config file, then `AH_*` environment variables, then
//! command line flags. [`HubConfig::resolve`] checks the merged result.

pub mod error;

pub use error::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "HUBSYNC_CONFIG_PATH";
pub const HOST_ENV: &str = "AH_HOST";
pub const TOKEN_ENV: &str = "AH_API_TOKEN";
pub const USERNAME_ENV: &str = "AH_USERNAME";
pub const PASSWORD_ENV: &str = "AH_PASSWORD";
pub const VERIFY_SSL_ENV: &str = "AH_VERIFY_SSL";

const LOCAL_CANDIDATES: [&str; 2] = ["hubsync.yml", ".hubsync.yml"];

/// Contents of a hubsync config file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HubConfig {
    pub host: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub validate_certs: bool,
    /// Seconds
    pub request_timeout: u64,
    /// Seconds between import task polls
    pub import_poll_interval: f64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: None,
            token: None,
            username: None,
            password: None,
            validate_certs: true,
            request_timeout: 30,
            import_poll_interval: 2.0,
        }
    }
}

/// Values given on the command line; `None` leaves the lower layer untouched
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub host: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub validate_certs: Option<bool>,
}

/// Merged settings with a host guaranteed
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub host: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub validate_certs: bool,
    pub request_timeout: Duration,
    pub import_poll_interval: Duration,
}

impl HubConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Discover and read the config file, then apply the environment
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match find_config_file(explicit)? {
            Some(path) => {
                tracing::debug!("Using config file {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(host) = env_value(HOST_ENV) {
            self.host = Some(host);
        }
        if let Some(token) = env_value(TOKEN_ENV) {
            self.token = Some(token);
        }
        if let Some(username) = env_value(USERNAME_ENV) {
            self.username = Some(username);
        }
        if let Some(password) = env_value(PASSWORD_ENV) {
            self.password = Some(password);
        }
        if let Some(verify) = env_value(VERIFY_SSL_ENV) {
            self.validate_certs = parse_bool(VERIFY_SSL_ENV, &verify)?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: ConnectionOverrides) {
        if overrides.host.is_some() {
            self.host = overrides.host;
        }
        if overrides.token.is_some() {
            self.token = overrides.token;
        }
        if overrides.username.is_some() {
            self.username = overrides.username;
        }
        if overrides.password.is_some() {
            self.password = overrides.password;
        }
        if let Some(validate_certs) = overrides.validate_certs {
            self.validate_certs = validate_certs;
        }
    }

    pub fn resolve(self) -> Result<ResolvedConfig> {
        let host = self
            .host
            .filter(|h| !h.trim().is_empty())
            .ok_or(ConfigError::MissingHost)?;

        let import_poll_interval = positive_seconds(self.import_poll_interval).ok_or_else(|| {
            ConfigError::InvalidValue {
                key: "import_poll_interval".to_string(),
                value: self.import_poll_interval.to_string(),
            }
        })?;

        Ok(ResolvedConfig {
            host,
            token: self.token,
            username: self.username,
            password: self.password,
            validate_certs: self.validate_certs,
            request_timeout: Duration::from_secs(self.request_timeout),
            import_poll_interval,
        })
    }
}

/// Global config file location (`<config_dir>/hubsync/config.yml`)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hubsync").join("config.yml"))
}

/// Locate the config file to read
///
/// Search order:
/// 1. explicit path (must exist)
/// 2. `HUBSYNC_CONFIG_PATH` (must exist)
/// 3. current directory: hubsync.yml, .hubsync.yml
/// 4. `<config_dir>/hubsync/config.yml`
///
/// `Ok(None)` means no file; defaults apply.
pub fn find_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return existing(path.to_path_buf()).map(Some);
    }

    if let Some(path) = env_value(CONFIG_PATH_ENV) {
        return existing(PathBuf::from(path)).map(Some);
    }

    let current_dir = std::env::current_dir()?;
    for filename in &LOCAL_CANDIDATES {
        let path = current_dir.join(filename);
        if path.is_file() {
            return Ok(Some(path));
        }
    }

    Ok(global_config_path().filter(|path| path.is_file()))
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ConfigError::NotFound(path))
    }
}

/// `None` unless `seconds` is positive and fits a `Duration`
fn positive_seconds(seconds: f64) -> Option<Duration> {
    if seconds <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(seconds).ok()
}

/// Unset and empty variables are treated alike
fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

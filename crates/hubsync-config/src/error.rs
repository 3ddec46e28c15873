use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "No Automation Hub host configured. Set it with one of:\n\
        - --host flag\n\
        - AH_HOST environment variable\n\
        - `host:` in hubsync.yml, .hubsync.yml or ~/.config/hubsync/config.yml"
    )]
    MissingHost,

    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

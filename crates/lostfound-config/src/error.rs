//! Config errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while loading, merging or validating a config layer.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A layer is not valid JSON5.
    #[error("config is not valid JSON5: {0}")]
    Parse(#[from] json5::Error),
    /// The merged value does not decode into the config model.
    #[error("config does not match the expected shape: {0}")]
    Decode(#[from] serde_json::Error),
    /// A single field is missing, mistyped or out of range.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// An intake flow is unusable as a whole.
    #[error("invalid intake flow {flow}: {message}")]
    InvalidFlow { flow: &'static str, message: String },
}

impl ConfigError {
    pub(crate) fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}

//! Layered configuration loader.
//!
//! Discovers configuration layers (user, cwd, runtime overrides), validates
//! their schema, merges them over the built-in defaults, and produces a final
//! `LostFoundConfig`.

mod layer_io;
mod merge;
mod schema;


use crate::{ConfigError, FieldKey, FlowConfig, LostFoundConfig};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename in local layers.
const DEFAULT_CONFIG_FILE: &str = "lostfound.json5";
/// Default config directory under the user's home.
const DEFAULT_CONFIG_DIR: &str = ".lostfound";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: LostFoundConfig,
    /// Metadata for each layer merged during load.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// User-specific configuration.
    User,
    /// Current working directory configuration.
    Cwd,
    /// Runtime overrides (highest precedence).
    Runtime,
}

/// Metadata about a merged config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    /// Layer origin.
    pub source: ConfigLayerSource,
    /// Location on disk.
    pub path: PathBuf,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory used to find the cwd layer.
    pub cwd: PathBuf,
    /// Optional user config path (defaults to `~/.lostfound/lostfound.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime override config paths applied last.
    pub runtime_paths: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
        }
    }

    /// Add a runtime override config path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl LostFoundConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config from path: {}", path.display());
        let contents = fs::read_to_string(path).map_err(|err| ConfigError::read(path, err))?;
        Self::load_from_str(&contents)
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        schema::validate_layer_schema(&value, "config")?;
        let mut merged = default_value()?;
        merge::merge_json_values(&mut merged, &value);
        config_from_value(merged)
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        info!(
            "loading layered config with defaults (cwd={})",
            cwd.as_ref().display()
        );
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack using explicit layer locations.
    ///
    /// Layer precedence (low -> high): built-in defaults, user, cwd, runtime
    /// overrides. Arrays (such as flow steps) are replaced, not concatenated.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let mut candidates = Vec::new();
        if let Some(path) = options.user_config_path.as_deref() {
            candidates.push((ConfigLayerSource::User, path.to_path_buf(), false));
        }
        candidates.push((
            ConfigLayerSource::Cwd,
            options.cwd.join(DEFAULT_CONFIG_FILE),
            false,
        ));
        for path in &options.runtime_paths {
            candidates.push((ConfigLayerSource::Runtime, path.clone(), true));
        }

        let mut merged = default_value()?;
        let mut layers = Vec::new();
        let mut seen_paths = HashSet::new();
        for (source, path, required) in candidates {
            if !required && !path.exists() {
                debug!(
                    "skipping missing layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            let unique = path.canonicalize().unwrap_or_else(|_| path.clone());
            if !seen_paths.insert(unique) {
                debug!(
                    "skipping duplicate layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            let value = layer_io::load_layer(source, &path)?;
            merge::merge_json_values(&mut merged, &value);
            layers.push(ConfigLayer { source, path });
        }

        let config = config_from_value(merged)?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_flow(&self.flows.lost, "lost")?;
        validate_flow(&self.flows.found, "found")?;
        if self
            .flows
            .found
            .steps
            .iter()
            .any(|step| step.field == FieldKey::ContactInfo)
        {
            return Err(ConfigError::InvalidFlow {
                flow: "found",
                message: "found items do not carry contact_info".to_string(),
            });
        }
        Ok(())
    }
}

fn validate_flow(flow: &FlowConfig, name: &'static str) -> Result<(), ConfigError> {
    if flow.steps.is_empty() {
        return Err(ConfigError::InvalidFlow {
            flow: name,
            message: "at least one step is required".to_string(),
        });
    }
    let mut seen = HashSet::new();
    for (idx, step) in flow.steps.iter().enumerate() {
        if !seen.insert(step.field) {
            return Err(ConfigError::InvalidField {
                path: format!("flows.{name}.steps[{idx}].field"),
                message: format!("duplicate field {}", step.field),
            });
        }
        if step.prompt.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                path: format!("flows.{name}.steps[{idx}].prompt"),
                message: "prompt must not be empty".to_string(),
            });
        }
    }
    Ok(())
}

fn default_value() -> Result<Value, ConfigError> {
    Ok(serde_json::to_value(LostFoundConfig::default())?)
}

fn config_from_value(value: Value) -> Result<LostFoundConfig, ConfigError> {
    let config: LostFoundConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}

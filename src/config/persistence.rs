//! Config file loading, reload and per-target module resolution.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::types::{ExporterConfig, ModuleConfig, DEFAULT_MODULE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Parse a YAML config document. Unknown keys and collector names are rejected.
pub fn parse_config(text: &str, path: &Path) -> Result<ExporterConfig, ConfigError> {
    // an empty file is a valid, empty config
    if text.trim().is_empty() {
        return Ok(ExporterConfig::default());
    }
    serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_config(path: &Path) -> Result<ExporterConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&content, path)?;
    info!("Loaded configuration from: {:?} ({} modules)", path, config.modules.len());
    Ok(config)
}

/// Configuration shared by concurrent scrapes and replaced on reload.
#[derive(Debug, Default)]
pub struct SafeConfig {
    inner: RwLock<ExporterConfig>,
}

impl SafeConfig {
    pub fn new(config: ExporterConfig) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    /// Start from `path` if given and present, otherwise from built-in defaults.
    /// A file that exists but does not parse is an error.
    pub fn from_path(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if p.exists() => Ok(Self::new(load_config(p)?)),
            Some(p) => {
                warn!("Config file {:?} not found, using built-in defaults", p);
                Ok(Self::default())
            }
            None => {
                info!("No config file given, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Replace the configuration with the contents of `path`.
    /// On failure the previous configuration stays active.
    pub fn reload(&self, path: &Path) -> Result<(), ConfigError> {
        let config = load_config(path)?;
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = config;
        Ok(())
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.read().modules.contains_key(module)
    }

    pub fn module_names(&self) -> Vec<String> {
        self.read().modules.keys().cloned().collect()
    }

    /// Resolve the options for one scrape: the named module, else the
    /// `default` module, else built-in defaults.
    pub fn config_for_target(&self, target: &str, module: &str) -> ModuleConfig {
        let config = self.read();

        if let Some(found) = config.modules.get(module) {
            debug!("Using module '{}' for target '{}'", module, target);
            return found.clone();
        }

        if let Some(default) = config.modules.get(DEFAULT_MODULE) {
            if module != DEFAULT_MODULE {
                warn!(
                    "Module '{}' not found for target '{}', using '{}' module",
                    module, target, DEFAULT_MODULE
                );
            }
            return default.clone();
        }

        debug!("No '{}' module configured, using built-in defaults", DEFAULT_MODULE);
        ModuleConfig::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ExporterConfig> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}

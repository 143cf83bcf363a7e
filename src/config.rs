//! Exporter configuration: YAML modules with per-target ipmitool options.

pub mod persistence;
pub mod types;

pub use persistence::{load_config, parse_config, ConfigError, SafeConfig};
pub use types::{CollectorName, ExporterConfig, ModuleConfig, DEFAULT_MODULE};

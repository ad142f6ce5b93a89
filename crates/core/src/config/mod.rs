//! Configuration: TOML profiles, environment overrides and validation.

pub mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, default_config_path};
pub use types::{ExportConfig, ExportSettings, LoggingConfig};

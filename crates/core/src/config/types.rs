use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::loader::ConfigError;
use crate::export::DEFAULT_MAX_DEPTH;

/// Default number of days, counting back from today, searched for daily notes.
pub const DEFAULT_DAYS_BACK: u32 = 7;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct Profile {
    pub vault_root: Option<String>,
    pub days_back: Option<u32>,
    /// Base directory that receives `export-<timestamp>` directories.
    pub export_dir: Option<String>,
    pub max_depth: Option<usize>,
    pub use_listing_tool: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Partially specified configuration, merged from file, environment and
/// command line before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSettings {
    pub vault_root: Option<PathBuf>,
    pub days_back: Option<u32>,
    pub export_base: Option<PathBuf>,
    pub max_depth: Option<usize>,
    pub timestamp: Option<NaiveDateTime>,
    pub use_listing_tool: Option<bool>,
    pub logging: LoggingConfig,
}

impl ExportSettings {
    /// Overlay every value set in `other` onto `self`.
    pub fn merge(&mut self, other: ExportSettings) {
        if other.vault_root.is_some() {
            self.vault_root = other.vault_root;
        }
        if other.days_back.is_some() {
            self.days_back = other.days_back;
        }
        if other.export_base.is_some() {
            self.export_base = other.export_base;
        }
        if other.max_depth.is_some() {
            self.max_depth = other.max_depth;
        }
        if other.timestamp.is_some() {
            self.timestamp = other.timestamp;
        }
        if other.use_listing_tool.is_some() {
            self.use_listing_tool = other.use_listing_tool;
        }
    }

    /// Validate and fill in defaults.
    pub fn resolve(self) -> Result<ExportConfig, ConfigError> {
        let mut config = ExportConfig::new(self.vault_root.unwrap_or_default())?;
        if let Some(days) = self.days_back {
            config.days_back = days;
        }
        if let Some(base) = self.export_base {
            config.export_base = base;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(tool) = self.use_listing_tool {
            config.use_listing_tool = tool;
        }
        config.timestamp = self.timestamp;
        config.logging = self.logging;
        Ok(config)
    }
}

/// Fully resolved configuration of an export run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub vault_root: PathBuf,
    pub days_back: u32,
    pub export_base: PathBuf,
    /// Link hops followed from each daily note.
    pub max_depth: usize,
    /// Frozen clock; `None` means the current local time.
    pub timestamp: Option<NaiveDateTime>,
    /// Whether the external `tree` listing may be used to build the index.
    pub use_listing_tool: bool,
    pub logging: LoggingConfig,
}

impl ExportConfig {
    /// Configuration with defaults for everything but the vault root.
    pub fn new(vault_root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let vault_root = vault_root.into();
        if vault_root.as_os_str().is_empty() {
            return Err(ConfigError::MissingVaultRoot);
        }

        Ok(Self {
            vault_root,
            days_back: DEFAULT_DAYS_BACK,
            export_base: default_export_base(),
            max_depth: DEFAULT_MAX_DEPTH,
            timestamp: None,
            use_listing_tool: true,
            logging: LoggingConfig::default(),
        })
    }
}

pub fn default_export_base() -> PathBuf {
    std::env::temp_dir().join("daylinks-exports")
}

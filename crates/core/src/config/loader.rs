use crate::config::types::{ConfigFile, ExportConfig, ExportSettings, Profile};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use shellexpand::full;
use std::path::{Path, PathBuf};
use std::{env, fs};

use dirs::home_dir;
use thiserror::Error;

pub const ENV_VAULT: &str = "DAYLINKS_VAULT";
pub const ENV_DAYS: &str = "DAYLINKS_DAYS";
pub const ENV_EXPORT_DIR: &str = "DAYLINKS_EXPORT_DIR";
pub const ENV_MAX_DEPTH: &str = "DAYLINKS_MAX_DEPTH";
pub const ENV_TIMESTAMP: &str = "DAYLINKS_TIMESTAMP";
pub const ENV_NO_TREE: &str = "DAYLINKS_NO_TREE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("vault root is not configured (set DAYLINKS_VAULT, a profile vault_root, or --vault)")]
    MissingVaultRoot,

    #[error("config file not found at {0}")]
    NotFound(String),

    #[error("failed to read config file {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("failed to parse TOML in {0}: {1}")]
    ParseError(String, #[source] toml::de::Error),

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("version {0} is unsupported (expected 1)")]
    BadVersion(u32),

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("home directory not available to expand '~'")]
    NoHome,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the config file and the process environment.
    pub fn load(
        config_path: Option<&Path>,
        profile_override: Option<&str>,
    ) -> Result<ExportConfig, ConfigError> {
        Self::load_settings(config_path, profile_override, |key| env::var(key).ok())?
            .resolve()
    }

    /// Merge file and environment settings without validating them.
    ///
    /// An explicit `config_path` must exist; the default location is optional.
    /// `lookup` reads environment variables.
    pub fn load_settings(
        config_path: Option<&Path>,
        profile_override: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ExportSettings, ConfigError> {
        let mut settings = match config_path {
            Some(path) => Self::from_file(path, profile_override)?,
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::from_file(&path, profile_override)?
                } else if let Some(name) = profile_override {
                    return Err(ConfigError::ProfileNotFound(name.to_string()));
                } else {
                    ExportSettings::default()
                }
            }
        };

        settings.merge(Self::from_env(lookup)?);
        Ok(settings)
    }

    /// Settings from a TOML config file and its active profile.
    pub fn from_file(
        path: &Path,
        profile_override: Option<&str>,
    ) -> Result<ExportSettings, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let s = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.display().to_string(), e))?;

        let cf: ConfigFile = toml::from_str(&s)
            .map_err(|e| ConfigError::ParseError(path.display().to_string(), e))?;

        if cf.version != 1 {
            return Err(ConfigError::BadVersion(cf.version));
        }

        let active = profile_override
            .map(ToOwned::to_owned)
            .or(cf.profile.clone())
            .unwrap_or_else(|| "default".to_string());

        let mut settings = match cf.profiles.get(&active) {
            Some(prof) => Self::resolve_profile(prof)?,
            None if profile_override.is_some() || cf.profile.is_some() => {
                return Err(ConfigError::ProfileNotFound(active));
            }
            None => ExportSettings::default(),
        };

        settings.logging = cf.logging;
        if let Some(ref file) = settings.logging.file {
            settings.logging.file = Some(expand_path(&file.to_string_lossy())?);
        }

        Ok(settings)
    }

    fn resolve_profile(prof: &Profile) -> Result<ExportSettings, ConfigError> {
        Ok(ExportSettings {
            vault_root: prof.vault_root.as_deref().map(expand_path).transpose()?,
            days_back: prof.days_back,
            export_base: prof.export_dir.as_deref().map(expand_path).transpose()?,
            max_depth: prof.max_depth,
            timestamp: None,
            use_listing_tool: prof.use_listing_tool,
            ..ExportSettings::default()
        })
    }

    /// Settings from `DAYLINKS_*` environment variables. Empty values are
    /// treated as unset.
    pub fn from_env(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ExportSettings, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(ExportSettings {
            vault_root: get(ENV_VAULT).as_deref().map(expand_path).transpose()?,
            days_back: get(ENV_DAYS).map(|v| parse_number(ENV_DAYS, &v)).transpose()?,
            export_base: get(ENV_EXPORT_DIR).as_deref().map(expand_path).transpose()?,
            max_depth: get(ENV_MAX_DEPTH)
                .map(|v| parse_number(ENV_MAX_DEPTH, &v))
                .transpose()?,
            timestamp: get(ENV_TIMESTAMP).map(|v| parse_timestamp(&v)).transpose()?,
            use_listing_tool: get(ENV_NO_TREE).map(|_| false),
            ..ExportSettings::default()
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Parse a frozen run timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`, or a bare
/// `YYYY-MM-DD` meaning midnight.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ConfigError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ConfigError::InvalidValue {
            key: ENV_TIMESTAMP.to_string(),
            value: value.to_string(),
        })
}

pub fn default_config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("daylinks").join("config.toml");
    }
    let home = home_dir().unwrap_or_else(|| PathBuf::from("~"));
    home.join(".config").join("daylinks").join("config.toml")
}

fn expand_path(input: &str) -> Result<PathBuf, ConfigError> {
    let expanded = full(input).map_err(|_| ConfigError::NoHome)?;
    Ok(PathBuf::from(expanded.to_string()))
}

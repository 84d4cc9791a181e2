//! Configuration system: TOML file + env var overrides + compiled defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, TallyError};

/// Full keytally configuration model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub persistence: PersistenceConfig,
    pub log: LogConfig,
    /// Path of the file this config was loaded from.
    #[serde(skip)]
    pub config_file: PathBuf,
}

/// Column layout for the tally table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Minimum width of the `label (key):` column.
    pub min_column_width: usize,
    /// Spaces kept between the widest label cell and the count column.
    pub column_padding: usize,
}

/// Where counts live between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Tally file used when no path argument is given on the command line.
    pub file: Option<PathBuf>,
}

/// JSONL activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Activity log path. `None` disables activity logging.
    pub activity_file: Option<PathBuf>,
    /// Secondary path tried when the primary cannot be opened.
    pub fallback_file: Option<PathBuf>,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            min_column_width: 20,
            column_padding: 4,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            activity_file: None,
            fallback_file: None,
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Config {
    /// Default configuration path: `~/.config/keytally/config.toml`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        let home_dir = env::var_os("HOME").map_or_else(|| PathBuf::from("/tmp"), PathBuf::from);
        home_dir.join(".config").join("keytally").join("config.toml")
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from the default path.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| TallyError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(TallyError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("KEYTALLY_RENDER_MIN_COLUMN_WIDTH") {
            self.render.min_column_width =
                parse_env_usize("KEYTALLY_RENDER_MIN_COLUMN_WIDTH", &raw)?;
        }
        if let Some(raw) = lookup("KEYTALLY_RENDER_COLUMN_PADDING") {
            self.render.column_padding = parse_env_usize("KEYTALLY_RENDER_COLUMN_PADDING", &raw)?;
        }
        if let Some(raw) = lookup("KEYTALLY_SAVE_FILE") {
            self.persistence.file = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("KEYTALLY_ACTIVITY_LOG") {
            self.log.activity_file = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("KEYTALLY_LOG_MAX_SIZE_BYTES") {
            self.log.max_size_bytes = parse_env_u64("KEYTALLY_LOG_MAX_SIZE_BYTES", &raw)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(1..=200).contains(&self.render.min_column_width) {
            return Err(TallyError::InvalidConfig {
                details: format!(
                    "render.min_column_width must be in [1, 200], got {}",
                    self.render.min_column_width
                ),
            });
        }
        if self.render.column_padding > 32 {
            return Err(TallyError::InvalidConfig {
                details: format!(
                    "render.column_padding must be <= 32, got {}",
                    self.render.column_padding
                ),
            });
        }
        if self.log.max_size_bytes == 0 {
            return Err(TallyError::InvalidConfig {
                details: "log.max_size_bytes must be > 0".to_string(),
            });
        }
        if self.log.max_rotated_files == 0 {
            return Err(TallyError::InvalidConfig {
                details: "log.max_rotated_files must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|error| TallyError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}

fn parse_env_usize(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|error| TallyError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}

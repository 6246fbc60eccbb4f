//! Config location, loading and environment overrides

use crate::error::join_errors;
use crate::file::ConfigFile;
use crate::{Config, ConfigError, ConfigResult};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `catalog.api_key`
pub const ENV_API_KEY: &str = "LEPKEHALO_MOLY_API_KEY";
/// Environment variable overriding `catalog.api_base`
pub const ENV_API_BASE: &str = "LEPKEHALO_MOLY_API_BASE";
/// Environment variable overriding `storage.data_dir`
pub const ENV_DATA_DIR: &str = "LEPKEHALO_DATA_DIR";

/// Locates and loads the configuration
///
/// Owns the config directory, the `config.toml` inside it and the default
/// data directory the book list is stored under.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    file: ConfigFile,
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl ConfigManager {
    /// Uses the platform directories
    ///
    /// - Linux: `~/.config/lepkehalo/` and `~/.local/share/lepkehalo/`
    /// - macOS: `~/Library/Application Support/hu.lepkehalo/`
    /// - Windows: `%APPDATA%\lepkehalo\`
    pub fn new() -> ConfigResult<Self> {
        let dirs = ProjectDirs::from("hu", "", "lepkehalo").ok_or(ConfigError::NoHomeDirectory)?;
        Ok(Self {
            file: ConfigFile::in_dir(dirs.config_dir()),
            config_dir: dirs.config_dir().to_path_buf(),
            data_dir: dirs.data_dir().to_path_buf(),
        })
    }

    /// Uses `config_dir`, with the data directory defaulting to `<config_dir>/data`
    pub fn with_directory(config_dir: PathBuf) -> Self {
        Self {
            file: ConfigFile::in_dir(&config_dir),
            data_dir: config_dir.join("data"),
            config_dir,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Path {
        self.file.path()
    }

    /// Directory the book list lives in; `storage.data_dir` wins
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        config
            .storage
            .data_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.clone())
    }

    /// Loads `config.toml`, or the defaults when there is no file
    pub fn load(&self) -> ConfigResult<Config> {
        match self.file.read()? {
            Some(config) => Ok(config),
            None => {
                log::debug!(
                    "No config at {}, using defaults",
                    self.file.path().display()
                );
                Ok(Config::default())
            }
        }
    }

    /// Validates and atomically saves the configuration
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.file.write(config)
    }

    /// Writes the default configuration unless a file exists
    ///
    /// Returns true if a file was created.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.file.exists() {
            return Ok(false);
        }
        self.save(&Config::default())?;
        Ok(true)
    }
}

/// Applies `LEPKEHALO_*` variables from the process environment
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |name| std::env::var(name).ok());
}

/// Applies overrides using `lookup` to resolve variable names
///
/// Empty values are ignored.
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(key) = var(ENV_API_KEY) {
        log::debug!("Using Moly.hu API key from {}", ENV_API_KEY);
        config.catalog.api_key = key;
    }

    if let Some(base) = var(ENV_API_BASE) {
        log::info!("Moly.hu API base overridden: {}", base);
        config.catalog.api_base = base;
    }

    if let Some(dir) = var(ENV_DATA_DIR) {
        log::info!("Data directory overridden: {}", dir);
        config.storage.data_dir = Some(PathBuf::from(dir));
    }

    if let Err(errors) = config.validate() {
        log::warn!("Environment overrides left invalid values: {}", join_errors(&errors));
    }
}

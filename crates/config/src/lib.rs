//! Lepkehaló configuration
//!
//! Settings live in a single `config.toml` split into sections, each a type
//! implementing [`ConfigSection`]. Missing keys take their defaults, a missing
//! file yields the default config, and saves are atomic.
//!
//! # Example
//!
//! ```rust,no_run
//! use lepkehalo_config::{apply_env_overrides, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to resolve config directory");
//! let mut config = manager.load().unwrap_or_default();
//! apply_env_overrides(&mut config);
//!
//! println!("Moly.hu API: {}", config.catalog.api_base);
//! ```

mod error;
mod file;
mod manager;
mod validation;

pub mod app_config;
mod catalog_config;
mod storage_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use file::ConfigFile;
pub use manager::{
    apply_env_overrides, apply_overrides_from, ConfigManager, ENV_API_BASE, ENV_API_KEY,
    ENV_DATA_DIR,
};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use catalog_config::CatalogConfig;
pub use storage_config::StorageConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Moly.hu catalog settings
    pub catalog: CatalogConfig,

    /// Book list storage settings
    pub storage: StorageConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every section, returning all errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.catalog.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.storage.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.catalog.merge(other.catalog);
        self.storage.merge(other.storage);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            catalog: CatalogConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

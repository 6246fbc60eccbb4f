//! Catalog configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Moly.hu API settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// API root the `book_by_isbn.json` endpoint lives under
    pub api_base: String,

    /// Root of the public book pages
    pub book_url_base: String,

    /// API key; replace the placeholder for production use
    pub api_key: String,

    /// Lookup timeout in milliseconds
    pub timeout_ms: u64,
}

impl CatalogConfig {
    pub const MIN_TIMEOUT_MS: u64 = 100;
    pub const MAX_TIMEOUT_MS: u64 = 120_000;

    /// Returns the timeout as a `Duration`
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base: "https://moly.hu/api".to_string(),
            book_url_base: "https://moly.hu/konyvek".to_string(),
            api_key: "dev-api-key".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl ConfigSection for CatalogConfig {
    const NAME: &'static str = "catalog";

    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::new(Self::NAME)
            .http_url("api_base", &self.api_base)
            .http_url("book_url_base", &self.book_url_base)
            .not_blank("api_key", &self.api_key)
            .in_range(
                "timeout_ms",
                self.timeout_ms,
                Self::MIN_TIMEOUT_MS..=Self::MAX_TIMEOUT_MS,
            )
            .finish()
    }

    fn merge(&mut self, other: Self) {
        *self = other;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = CatalogConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), std::time::Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = CatalogConfig::default();
        config.timeout_ms = 10;
        assert!(config.validate().is_err());

        config.timeout_ms = 600_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_http_base_is_invalid() {
        let mut config = CatalogConfig::default();
        config.api_base = "ftp://moly.hu/api".to_string();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "catalog.api_base");
    }

    #[test]
    fn test_empty_api_key_is_invalid() {
        let mut config = CatalogConfig::default();
        config.api_key = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge() {
        let mut base = CatalogConfig::default();
        let mut other = CatalogConfig::default();
        other.api_key = "prod-key".to_string();
        other.timeout_ms = 5_000;

        base.merge(other);
        assert_eq!(base.api_key, "prod-key");
        assert_eq!(base.timeout_ms, 5_000);
    }
}

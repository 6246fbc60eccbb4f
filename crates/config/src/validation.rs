//! Checks shared by the config sections
//!
//! A section walks its fields through a [`Validator`], which records every
//! problem instead of stopping at the first so the user can fix a hand-edited
//! file in one pass.

pub use crate::error::ValidationError;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::Path;

/// One `[section]` of `config.toml`
pub trait ConfigSection: Default {
    /// Table name, also the prefix of reported field paths
    const NAME: &'static str;

    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Takes every value `other` sets explicitly
    fn merge(&mut self, other: Self);
}

/// Collects the problems found in one section
#[derive(Debug)]
pub struct Validator {
    section: &'static str,
    errors: Vec<ValidationError>,
}

impl Validator {
    pub fn new(section: &'static str) -> Self {
        Self {
            section,
            errors: Vec::new(),
        }
    }

    fn reject(&mut self, key: &str, message: impl Into<String>, value: Option<String>) {
        let field = format!("{}.{}", self.section, key);
        self.errors.push(match value {
            Some(value) => ValidationError::with_value(field, message, value),
            None => ValidationError::new(field, message),
        });
    }

    pub fn in_range<T>(&mut self, key: &str, value: T, range: RangeInclusive<T>) -> &mut Self
    where
        T: PartialOrd + Display,
    {
        if !range.contains(&value) {
            let message = format!("must be in {}..={}", range.start(), range.end());
            self.reject(key, message, Some(value.to_string()));
        }
        self
    }

    pub fn not_blank(&mut self, key: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.reject(key, "must not be empty", None);
        }
        self
    }

    /// Requires `http://` or `https://` followed by a host
    pub fn http_url(&mut self, key: &str, value: &str) -> &mut Self {
        let host_and_path = value
            .strip_prefix("https://")
            .or_else(|| value.strip_prefix("http://"));

        let ok = matches!(
            host_and_path,
            Some(rest) if !rest.is_empty() && !rest.starts_with('/') && !rest.contains(char::is_whitespace)
        );
        if !ok {
            self.reject(key, "must be an http:// or https:// URL", Some(value.to_string()));
        }
        self
    }

    /// Requires a name the storage backends accept as a key
    pub fn storage_key(&mut self, key: &str, value: &str) -> &mut Self {
        if !lepkehalo_storage::is_valid_key(value) {
            self.reject(
                key,
                "must be ASCII letters, digits, '_', '-' or '.', not starting with '.'",
                Some(value.to_string()),
            );
        }
        self
    }

    /// Rejects an empty path, or one that exists but is not a directory
    ///
    /// A missing directory is fine; it is created on first write.
    pub fn directory(&mut self, key: &str, path: &Path) -> &mut Self {
        if path.as_os_str().is_empty() {
            self.reject(key, "must not be empty when set", None);
        } else if path.exists() && !path.is_dir() {
            self.reject(key, "is not a directory", Some(path.display().to_string()));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(result: Result<(), Vec<ValidationError>>) -> Vec<String> {
        result
            .err()
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.field)
            .collect()
    }

    #[test]
    fn test_in_range_is_inclusive() {
        let mut v = Validator::new("catalog");
        v.in_range("timeout_ms", 100, 100..=200)
            .in_range("timeout_ms", 200, 100..=200);
        assert!(v.finish().is_ok());

        let errors = Validator::new("catalog")
            .in_range("timeout_ms", 99u64, 100..=200)
            .finish()
            .unwrap_err();
        assert_eq!(errors[0].field, "catalog.timeout_ms");
        assert_eq!(errors[0].value.as_deref(), Some("99"));
    }

    #[test]
    fn test_collects_every_problem() {
        let result = Validator::new("catalog")
            .not_blank("api_key", "  ")
            .http_url("api_base", "moly.hu/api")
            .in_range("timeout_ms", 5, 100..=200)
            .finish();

        assert_eq!(
            fields(result),
            ["catalog.api_key", "catalog.api_base", "catalog.timeout_ms"]
        );
    }

    #[test]
    fn test_http_url() {
        let check = |url: &str| Validator::new("catalog").http_url("api_base", url).finish();

        assert!(check("https://moly.hu/api").is_ok());
        assert!(check("http://127.0.0.1:8080").is_ok());
        assert!(check("https://").is_err());
        assert!(check("https:///api").is_err());
        assert!(check("ftp://moly.hu").is_err());
        assert!(check("https://moly hu").is_err());
    }

    #[test]
    fn test_storage_key_matches_storage_rules() {
        for key in ["books", "books-v2", "shelf.old"] {
            assert!(Validator::new("storage").storage_key("books_key", key).finish().is_ok());
            assert!(lepkehalo_storage::is_valid_key(key));
        }
        for key in ["", "../books", "a/b", ".hidden", "könyvek"] {
            assert!(Validator::new("storage").storage_key("books_key", key).finish().is_err());
            assert!(!lepkehalo_storage::is_valid_key(key));
        }
    }

    #[test]
    fn test_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let check = |path: &Path| Validator::new("storage").directory("data_dir", path).finish();

        assert!(check(std::env::temp_dir().as_path()).is_ok());
        assert!(check(Path::new("/this/path/does/not/exist/yet")).is_ok());
        assert!(check(file.path()).is_err());
        assert!(check(Path::new("")).is_err());
    }
}

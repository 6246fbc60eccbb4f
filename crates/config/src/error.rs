//! Config errors

use lepkehalo_core::AppError;
use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform gave no home directory to derive the config path from
    #[error("No home directory to keep the configuration in")]
    NoHomeDirectory,

    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file exists but holds only whitespace
    #[error("{} is empty", .path.display())]
    Empty { path: PathBuf },

    #[error("{} is not valid TOML: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Save refused; the file on disk was not touched
    #[error("Refusing to save an invalid configuration: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Cannot encode configuration: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A problem with one config value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the value, e.g. `catalog.timeout_ms`
    pub field: String,
    pub message: String,
    /// The rejected value, when it is worth echoing back
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::new(field, message)
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)?;
        if let Some(ref value) = self.value {
            write!(f, " (got '{}')", value)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Renders a list of problems on one line
pub(crate) fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidConfiguration {
            setting: err.field,
            value: err.value.unwrap_or_default(),
            reason: err.message,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Empty { path } | ConfigError::Parse { path, .. } => {
                AppError::ConfigurationCorrupted { path }
            }
            ConfigError::Invalid(errors) => match errors.into_iter().next() {
                Some(first) => first.into(),
                None => AppError::InternalError {
                    message: "configuration rejected without a reason".to_string(),
                },
            },
            ConfigError::Read { path, source } | ConfigError::Write { path, source } => {
                AppError::IoError {
                    message: format!("{}: {}", path.display(), source),
                    source,
                }
            }
            other => AppError::InternalError {
                message: other.to_string(),
            },
        }
    }
}

//! Error types and recovery strategies for Lepkehaló
//!
//! Errors fall into three severity tiers:
//! - **Recoverable**: can be retried (catalog timeouts, transient storage failures)
//! - **Degraded**: a feature is unavailable but the app continues (catalog down)
//! - **Fatal**: requires user intervention (corrupted configuration)
//!
//! Data-shape problems in the stored book list never reach this type; the
//! codec degrades them to an empty or partial list instead.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Retry the operation immediately
    RetryImmediate,
    /// Retry later, e.g. on the next scan or the next list mutation
    RetryLater,
    /// Disable the failing feature and continue
    DisableFeature,
    /// Fall back to default settings
    UseDefaults,
    /// No automatic recovery - user intervention required
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryImmediate => write!(f, "Retrying immediately"),
            Self::RetryLater => write!(f, "Retrying later"),
            Self::DisableFeature => write!(f, "Disabling feature"),
            Self::UseDefaults => write!(f, "Using defaults"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Error can be automatically recovered from
    Recoverable,
    /// Feature degraded but app can continue
    Degraded,
    /// Critical error requiring user action
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Main error type for Lepkehaló
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Storage Errors =====
    /// Reading a key from persistent storage failed
    #[error("Storage read failed for key '{key}': {message}")]
    StorageReadFailed { key: String, message: String },

    /// Writing a key to persistent storage failed
    #[error("Storage write failed for key '{key}': {message}")]
    StorageWriteFailed { key: String, message: String },

    /// Storage backend could not be used at all
    #[error("Storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    /// The book list could not be encoded
    #[error("Failed to encode book list: {message}")]
    EncodeFailed { message: String },

    // ===== Catalog Errors =====
    /// Catalog could not be reached (no response)
    #[error("Catalog unreachable: {message}")]
    CatalogUnreachable { message: String },

    /// Catalog answered with an error status
    #[error("Catalog server error: HTTP {status}")]
    CatalogServerError { status: u16 },

    /// Catalog answered with an unexpected body
    #[error("Invalid catalog response: {details}")]
    InvalidCatalogResponse { details: String },

    // ===== Library Errors =====
    /// Book is not in the list
    #[error("Book not found: {id}")]
    BookNotFound { id: String },

    // ===== Configuration Errors =====
    /// Invalid configuration
    #[error("Invalid configuration: {setting} = '{value}' ({reason})")]
    InvalidConfiguration {
        setting: String,
        value: String,
        reason: String,
    },

    /// Configuration file corrupted
    #[error("Configuration corrupted: {path}")]
    ConfigurationCorrupted { path: PathBuf },

    // ===== Generic Errors =====
    /// General I/O error
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    /// Invalid argument provided
    #[error("Invalid argument: {argument} - {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CatalogUnreachable { .. }
            | Self::StorageReadFailed { .. }
            | Self::StorageWriteFailed { .. } => ErrorSeverity::Recoverable,

            Self::CatalogServerError { .. }
            | Self::InvalidCatalogResponse { .. }
            | Self::StorageUnavailable { .. }
            | Self::BookNotFound { .. }
            | Self::InvalidConfiguration { .. } => ErrorSeverity::Degraded,

            Self::ConfigurationCorrupted { .. } | Self::EncodeFailed { .. } => {
                ErrorSeverity::Fatal
            }

            _ => ErrorSeverity::Degraded,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::CatalogUnreachable { .. } => RecoveryAction::RetryImmediate,

            Self::CatalogServerError { .. }
            | Self::StorageReadFailed { .. }
            | Self::StorageWriteFailed { .. } => RecoveryAction::RetryLater,

            Self::InvalidCatalogResponse { .. } | Self::StorageUnavailable { .. } => {
                RecoveryAction::DisableFeature
            }

            Self::InvalidConfiguration { .. } | Self::ConfigurationCorrupted { .. } => {
                RecoveryAction::UseDefaults
            }

            _ => RecoveryAction::UserIntervention,
        }
    }

    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            Self::StorageReadFailed { .. } | Self::StorageUnavailable { .. } => {
                "Your saved books could not be loaded.".to_string()
            }
            Self::StorageWriteFailed { .. } | Self::EncodeFailed { .. } => {
                "Your latest change could not be saved.".to_string()
            }
            Self::CatalogUnreachable { .. }
            | Self::CatalogServerError { .. }
            | Self::InvalidCatalogResponse { .. } => {
                "Moly.hu is not reachable right now. Please try again.".to_string()
            }
            Self::BookNotFound { .. } => "This book is not in your list.".to_string(),
            Self::InvalidConfiguration { setting, .. } => {
                format!("Invalid setting: {}. Please check your configuration.", setting)
            }
            Self::ConfigurationCorrupted { path } => format!(
                "Settings file {} is unreadable; using defaults.",
                path.display()
            ),
            Self::IoError { .. } => "A file operation failed. Please try again.".to_string(),
            Self::InvalidArgument { .. } => "Invalid input provided.".to_string(),
            Self::InternalError { .. } => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }

    /// Returns true if this error should be logged at ERROR level
    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }

    /// Returns true if this error can be automatically retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.recovery_action(),
            RecoveryAction::RetryImmediate | RecoveryAction::RetryLater
        )
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        Self::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

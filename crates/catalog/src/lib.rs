// FILE: crates/catalog/src/lib.rs
//! Catalog lookup for scanned ISBNs
//!
//! The only catalog is Moly.hu. A lookup has three outcomes: a book, `None`
//! when the catalog does not know the ISBN, or a [`CatalogError`] that keeps
//! "could not reach the server" apart from "the server answered with an error".

mod moly;
mod traits;

pub use moly::{book_url, MolyClient, MolyConfig};
pub use traits::CatalogLookup;

use lepkehalo_core::AppError;
use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors from catalog lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No response from the catalog (offline, DNS, refused, timed out)
    #[error("Network error: Unable to reach Moly.hu ({0})")]
    Network(String),
    /// The catalog answered with an error status other than 404
    #[error("Server error: {status}")]
    Server { status: u16 },
    /// The catalog answered 2xx with a body that is not a book
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// The ISBN cannot be looked up
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// The HTTP client could not be built
    #[error("HTTP client unavailable: {0}")]
    Client(String),
}

impl CatalogError {
    /// Returns true if the catalog could not be reached at all
    pub fn is_network_error(&self) -> bool {
        matches!(self, CatalogError::Network(_))
    }

    /// Returns the HTTP status for server errors
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CatalogError::Server { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Network(message) => AppError::CatalogUnreachable { message },
            CatalogError::Server { status } => AppError::CatalogServerError { status },
            CatalogError::InvalidResponse(details) => AppError::InvalidCatalogResponse { details },
            CatalogError::InvalidQuery(reason) => AppError::InvalidArgument {
                argument: "isbn".to_string(),
                reason,
            },
            CatalogError::Client(message) => AppError::InternalError { message },
        }
    }
}

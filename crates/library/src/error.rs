// FILE: crates/library/src/error.rs

use lepkehalo_core::AppError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("The book list store needs a Tokio runtime to start its writer")]
    NoRuntime,
}

pub type LibraryResult<T> = std::result::Result<T, LibraryError>;

impl From<LibraryError> for AppError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::BookNotFound(id) => AppError::BookNotFound { id },
            LibraryError::NoRuntime => AppError::InternalError {
                message: "book list store started outside a Tokio runtime".to_string(),
            },
        }
    }
}

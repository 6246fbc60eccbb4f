//! Lepkehaló core: the book model, its persisted form and the shared error taxonomy

pub mod codec;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use codec::{decode_books, encode_books};
pub use error::{AppError, ErrorSeverity, RecoveryAction, Result};
pub use types::{
    create_book, is_valid_book, validate_book_value, Book, BookId, NewBook, Timestamp, Validator,
};

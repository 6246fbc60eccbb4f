//! Domain types for Lepkehaló
//!
//! - `book`: the Book record, its id, the factory and the untyped shape check
//! - `common`: timestamps and the `Validator` trait

mod book;
mod common;

pub use book::{
    create_book, is_valid_book, validate_book_value, Book, BookId, BookShape, NewBook,
};
pub use common::{Timestamp, Validator};

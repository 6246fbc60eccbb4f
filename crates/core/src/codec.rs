//! Persisted form of the book list
//!
//! The whole list is stored as one JSON array. Decoding is best-effort: a
//! missing, unparseable or non-array blob yields an empty list, and individual
//! entries that fail the book shape check are dropped while the rest keep
//! their relative order.

use crate::error::{AppError, Result};
use crate::types::Book;
use serde_json::Value;

/// Encodes the full list, order preserved
pub fn encode_books(books: &[Book]) -> Result<String> {
    serde_json::to_string(books).map_err(|e| AppError::EncodeFailed {
        message: e.to_string(),
    })
}

/// Decodes a stored list, never failing
///
/// `None` means the key was never written.
pub fn decode_books(text: Option<&str>) -> Vec<Book> {
    let Some(text) = text else {
        return Vec::new();
    };

    let parsed: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Stored book list is not valid JSON, starting empty: {}", e);
            return Vec::new();
        }
    };

    let Value::Array(entries) = parsed else {
        log::warn!("Stored book list is not an array, starting empty");
        return Vec::new();
    };

    let total = entries.len();
    let books: Vec<Book> = entries.iter().filter_map(Book::from_json).collect();

    if books.len() < total {
        log::debug!(
            "Dropped {} malformed entries from stored book list",
            total - books.len()
        );
    }

    books
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BookId, Timestamp};
    use proptest::prelude::*;
    use serde_json::json;

    fn book(id: &str, added_at: i64) -> Book {
        Book {
            id: BookId::from(id),
            title: format!("Book {}", id),
            author: format!("A{}", id),
            thumbnail_url: String::new(),
            isbn: None,
            added_at: Timestamp::from_millis(added_at),
        }
    }

    #[test]
    fn test_absent_text_is_empty() {
        assert!(decode_books(None).is_empty());
    }

    #[test]
    fn test_empty_string_is_empty() {
        assert!(decode_books(Some("")).is_empty());
    }

    #[test]
    fn test_garbage_is_empty() {
        assert!(decode_books(Some("not valid json{{{")).is_empty());
    }

    #[test]
    fn test_non_array_is_empty() {
        assert!(decode_books(Some(r#"{"id":"1"}"#)).is_empty());
        assert!(decode_books(Some("42")).is_empty());
        assert!(decode_books(Some("null")).is_empty());
    }

    #[test]
    fn test_invalid_entries_are_dropped_in_order() {
        let text = json!([
            {"id": "1", "title": "Book 1", "author": "A1", "thumbnailUrl": "", "addedAt": 1000},
            {"invalid": "data"},
            null,
            {"id": "2", "title": "Book 2", "author": "A2", "thumbnailUrl": "", "addedAt": 2000}
        ])
        .to_string();

        let books = decode_books(Some(&text));
        assert_eq!(books, vec![book("1", 1000), book("2", 2000)]);
    }

    #[test]
    fn test_encode_preserves_order() {
        let books = vec![book("2", 2000), book("1", 1000)];
        let text = encode_books(&books).unwrap();
        assert!(text.find("\"2\"").unwrap() < text.find("\"1\"").unwrap());
    }

    #[test]
    fn test_roundtrip_with_isbn() {
        let mut first = book("1", 1000);
        first.isbn = Some("9789630778459".to_string());
        first.thumbnail_url = "https://moly.hu/covers/1.jpg".to_string();
        let books = vec![first, book("2", 2000)];

        let text = encode_books(&books).unwrap();
        assert_eq!(decode_books(Some(&text)), books);
    }

    fn arb_book() -> impl Strategy<Value = Book> {
        (
            "[a-z0-9]{1,8}",
            ".{0,12}",
            ".{0,12}",
            prop_oneof![Just(String::new()), "https://[a-z]{1,8}\\.hu/[a-z0-9]{1,8}"],
            proptest::option::of("[0-9]{10,13}"),
            0i64..=4_000_000_000_000,
        )
            .prop_map(|(id, title, author, thumbnail_url, isbn, added_at)| Book {
                id: BookId::from(id),
                title,
                author,
                thumbnail_url,
                isbn,
                added_at: Timestamp::from_millis(added_at),
            })
    }

    proptest! {
        #[test]
        fn prop_encode_decode_roundtrip(books in proptest::collection::vec(arb_book(), 0..20)) {
            let text = encode_books(&books).unwrap();
            prop_assert_eq!(decode_books(Some(&text)), books);
        }

        #[test]
        fn prop_decode_never_panics(text in ".{0,64}") {
            let _ = decode_books(Some(&text));
        }
    }
}

//! Book domain model and the shape check applied to untyped book data

use crate::types::{Timestamp, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Catalog identifier of a book
///
/// Always held as a string; numeric catalog ids are stringified on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Creates a BookId from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BookId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for BookId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<&String> for BookId {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

impl From<u64> for BookId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for BookId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl PartialEq<str> for BookId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BookId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A book the user has scanned or added
///
/// Field names on the wire match the persisted list format
/// (`thumbnailUrl`, `addedAt`); `isbn` is omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// Cover image URL, empty when the catalog has no cover
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    pub added_at: Timestamp,
}

impl Book {
    /// Returns true if the book has a cover image
    pub fn has_cover(&self) -> bool {
        !self.thumbnail_url.is_empty()
    }

    /// Builds a book from untyped JSON, or `None` if the value is not book-shaped
    ///
    /// A non-string `isbn` is read as absent and a fractional `addedAt`
    /// is truncated to whole milliseconds.
    pub fn from_json(value: &Value) -> Option<Self> {
        if !is_valid_book(value) {
            return None;
        }

        let str_field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
        let added_at = value.get("addedAt").and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_u64().map(|n| n.min(i64::MAX as u64) as i64))
                .or_else(|| v.as_f64().map(|n| n as i64))
        })?;

        Some(Self {
            id: BookId::new(str_field("id")?),
            title: str_field("title")?,
            author: str_field("author")?,
            thumbnail_url: str_field("thumbnailUrl")?,
            isbn: str_field("isbn"),
            added_at: Timestamp::from_millis(added_at),
        })
    }
}

/// Input to [`create_book`]
#[derive(Debug, Clone)]
pub struct NewBook {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub thumbnail_url: String,
    pub isbn: Option<String>,
}

impl NewBook {
    /// Creates the input with required fields and no ISBN
    pub fn new(
        id: impl Into<BookId>,
        title: impl Into<String>,
        author: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            thumbnail_url: thumbnail_url.into(),
            isbn: None,
        }
    }

    /// Sets the ISBN the book was found by
    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }
}

/// Creates a book stamped with the current time
pub fn create_book(params: NewBook) -> Book {
    Book {
        id: params.id,
        title: params.title,
        author: params.author,
        thumbnail_url: params.thumbnail_url,
        isbn: params.isbn,
        added_at: Timestamp::now(),
    }
}

/// Borrowed view of untyped data checked against the book shape
pub struct BookShape<'a>(pub &'a Value);

impl Validator for BookShape<'_> {
    fn validate(&self) -> Result<(), Vec<String>> {
        let Some(object) = self.0.as_object() else {
            return Err(vec!["Book must be an object".to_string()]);
        };

        let mut errors = Vec::new();

        for field in ["id", "title", "author", "thumbnailUrl"] {
            if !object.get(field).is_some_and(Value::is_string) {
                errors.push(format!("Field '{}' must be a string", field));
            }
        }

        if !object.get("addedAt").is_some_and(Value::is_number) {
            errors.push("Field 'addedAt' must be a number".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Checks untyped data against the book shape, listing every violation
pub fn validate_book_value(value: &Value) -> Result<(), Vec<String>> {
    BookShape(value).validate()
}

/// Returns true if untyped data has the shape of a book
pub fn is_valid_book(value: &Value) -> bool {
    BookShape(value).is_valid()
}

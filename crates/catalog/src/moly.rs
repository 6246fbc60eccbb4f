// FILE: crates/catalog/src/moly.rs

use crate::{CatalogError, CatalogLookup, CatalogResult};
use async_trait::async_trait;
use lepkehalo_core::{create_book, Book, BookId, NewBook};
use serde::Deserialize;
use std::time::Duration;

/// Connection settings for the Moly.hu API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MolyConfig {
    /// API root, e.g. `https://moly.hu/api`
    pub api_base: String,
    /// Root of the public book pages, e.g. `https://moly.hu/konyvek`
    pub book_url_base: String,
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl MolyConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://moly.hu/api";
    pub const DEFAULT_BOOK_URL_BASE: &'static str = "https://moly.hu/konyvek";
    pub const DEFAULT_API_KEY: &'static str = "dev-api-key";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Sets the API root
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets the root of the public book pages
    pub fn with_book_url_base(mut self, book_url_base: impl Into<String>) -> Self {
        self.book_url_base = book_url_base.into();
        self
    }

    /// Sets the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Sets the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for MolyConfig {
    fn default() -> Self {
        Self {
            api_base: Self::DEFAULT_API_BASE.to_string(),
            book_url_base: Self::DEFAULT_BOOK_URL_BASE.to_string(),
            api_key: Self::DEFAULT_API_KEY.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
                .to_string(),
        }
    }
}

/// Returns the public web page of a catalog record
pub fn book_url(book_url_base: &str, book_id: &str) -> String {
    format!("{}/{}", book_url_base.trim_end_matches('/'), book_id)
}

/// Catalog id as Moly.hu sends it: usually a number, sometimes a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MolyId {
    Number(u64),
    Text(String),
}

impl From<MolyId> for BookId {
    fn from(id: MolyId) -> Self {
        match id {
            MolyId::Number(n) => BookId::from(n),
            MolyId::Text(s) => BookId::from(s),
        }
    }
}

/// Body of `book_by_isbn.json`
#[derive(Debug, Deserialize)]
struct MolyBookResponse {
    id: MolyId,
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    cover: Option<String>,
}

/// Moly.hu API client
#[derive(Debug, Clone)]
pub struct MolyClient {
    config: MolyConfig,
    client: reqwest::Client,
}

impl MolyClient {
    /// Creates a client with the default configuration
    pub fn new() -> CatalogResult<Self> {
        Self::with_config(MolyConfig::default())
    }

    /// Creates a client with a custom configuration
    pub fn with_config(config: MolyConfig) -> CatalogResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| CatalogError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Returns the active configuration
    pub fn config(&self) -> &MolyConfig {
        &self.config
    }

    /// Returns the Moly.hu page of a book
    pub fn book_url(&self, book_id: &str) -> String {
        book_url(&self.config.book_url_base, book_id)
    }

    /// Searches for a book by ISBN-10 or ISBN-13
    pub async fn search_by_isbn(&self, isbn: &str) -> CatalogResult<Option<Book>> {
        let isbn = isbn.trim();
        if isbn.is_empty() {
            return Err(CatalogError::InvalidQuery("Empty ISBN".to_string()));
        }

        let url = format!(
            "{}/book_by_isbn.json",
            self.config.api_base.trim_end_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .query(&[("q", isbn), ("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                log::warn!("Moly.hu request for ISBN {} failed: {}", isbn, e);
                CatalogError::Network(e.to_string())
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            log::info!("ISBN {} not found on Moly.hu", isbn);
            return Ok(None);
        }

        if !status.is_success() {
            log::warn!("Moly.hu answered HTTP {} for ISBN {}", status.as_u16(), isbn);
            return Err(CatalogError::Server {
                status: status.as_u16(),
            });
        }

        let body: MolyBookResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                CatalogError::InvalidResponse(format!("JSON parse error: {}", e))
            } else {
                CatalogError::Network(e.to_string())
            }
        })?;

        let book = create_book(
            NewBook::new(
                body.id,
                body.title,
                body.author,
                body.cover.unwrap_or_default(),
            )
            .with_isbn(isbn),
        );

        log::debug!("ISBN {} resolved to Moly.hu book {}", isbn, book.id);
        Ok(Some(book))
    }
}

#[async_trait]
impl CatalogLookup for MolyClient {
    async fn find_by_isbn(&self, isbn: &str) -> CatalogResult<Option<Book>> {
        self.search_by_isbn(isbn).await
    }

    fn name(&self) -> &str {
        "Moly.hu"
    }
}

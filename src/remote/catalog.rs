//! Open Library bibliographic lookup.

use std::time::Duration;

use serde::Deserialize;

use crate::models::Isbn;

use super::error::{RemoteError, retry_with_backoff};

const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

/// Bibliographic data for one ISBN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub title: String,
    /// First listed author, if any.
    pub author: Option<String>,
    /// Free-form subject tags in catalog order.
    pub subjects: Vec<String>,
}

/// Looks up bibliographic data by ISBN.
///
/// Implemented by [`CatalogClient`]; tests substitute their own catalogs.
pub trait CatalogLookup: Send + Sync {
    /// Returns the record for `isbn`, or `None` if the catalog has no usable entry.
    fn lookup(&self, isbn: &Isbn) -> Result<Option<CatalogRecord>, RemoteError>;
}

/// Builder for [`CatalogClient`].
///
/// # Examples
///
/// ```
/// use shelf::remote::CatalogClientBuilder;
///
/// let client = CatalogClientBuilder::new()
///     .base_url("https://openlibrary.org")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.base_url(), "https://openlibrary.org");
/// ```
#[derive(Debug, Default)]
pub struct CatalogClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    retries: usize,
}

impl CatalogClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the catalog base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Overrides the 10 second request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how many times transient failures are retried (default 0).
    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Builds the client.
    ///
    /// # Environment Variables
    ///
    /// If `base_url()` was not called, `OPENLIBRARY_URL` is used, falling
    /// back to `https://openlibrary.org`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidUrl`] for an unparseable base URL.
    pub fn build(self) -> Result<CatalogClient, RemoteError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => std::env::var("OPENLIBRARY_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        };
        let base_url = base_url.trim_end_matches('/').to_string();

        reqwest::Url::parse(&base_url)
            .map_err(|e| RemoteError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(10)))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(RemoteError::Network)?;

        Ok(CatalogClient {
            client,
            base_url,
            retries: self.retries,
        })
    }
}

/// Blocking client for the Open Library books API.
pub struct CatalogClient {
    client: reqwest::blocking::Client,
    base_url: String,
    retries: usize,
}

impl CatalogClient {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch(&self, isbn: &Isbn) -> Result<serde_json::Value, RemoteError> {
        let url = format!("{}/api/books", self.base_url);
        let bibkey = format!("ISBN:{}", isbn);

        retry_with_backoff(self.retries, || {
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("bibkeys", bibkey.as_str()),
                    ("format", "json"),
                    ("jscmd", "data"),
                ])
                .send()?;

            let status = response.status();
            if !status.is_success() {
                return Err(RemoteError::Http {
                    status: status.as_u16(),
                });
            }

            let body = response.text()?;
            serde_json::from_str(&body).map_err(RemoteError::Serialization)
        })
    }
}

impl CatalogLookup for CatalogClient {
    fn lookup(&self, isbn: &Isbn) -> Result<Option<CatalogRecord>, RemoteError> {
        let body = self.fetch(isbn)?;
        parse_record(&body, isbn)
    }
}

#[derive(Debug, Deserialize)]
struct BookData {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<NamedEntry>,
    #[serde(default)]
    subjects: Vec<Subject>,
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Subject {
    Named(NamedEntry),
    Plain(String),
}

impl Subject {
    fn into_name(self) -> String {
        match self {
            Self::Named(entry) => entry.name,
            Self::Plain(name) => name,
        }
    }
}

/// Extracts the record for `isbn` from a `jscmd=data` response body.
///
/// The record sits under the `ISBN:<isbn>` key. A missing key or a blank
/// title means the book was not found.
fn parse_record(
    body: &serde_json::Value,
    isbn: &Isbn,
) -> Result<Option<CatalogRecord>, RemoteError> {
    let Some(entry) = body.get(format!("ISBN:{}", isbn)) else {
        return Ok(None);
    };

    let data: BookData =
        serde_json::from_value(entry.clone()).map_err(RemoteError::Serialization)?;

    let Some(title) = data.title.filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };

    Ok(Some(CatalogRecord {
        title,
        author: data.authors.into_iter().next().map(|a| a.name),
        subjects: data.subjects.into_iter().map(Subject::into_name).collect(),
    }))
}

//! Genre-partitioned, author-sorted book collection.
//!
//! The collection is persisted as a human-readable report:
//!
//! ```text
//! BOOK COLLECTION - ORGANIZED BY GENRE AND AUTHOR
//! ===================================================
//!
//! Fantasy:
//!   J.R.R. Tolkien - The Hobbit [9780547928227]
//!
//! ```
//!
//! Genres appear in alphabetical order. The same report is parsed back on
//! startup so successive sessions keep growing one collection.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{Book, Isbn};

const REPORT_TITLE: &str = "BOOK COLLECTION - ORGANIZED BY GENRE AND AUTHOR";
const RULE_WIDTH: usize = 51;
const ENTRY_INDENT: &str = "  ";

/// Books grouped by genre, each group sorted by author.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    genres: BTreeMap<String, Vec<Book>>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `book` to the bucket named by its genre.
    ///
    /// The bucket is re-sorted by author with a stable sort, so books by the
    /// same author keep their insertion order. Duplicate ISBNs are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelf::{Book, Collection, Isbn};
    ///
    /// let isbn = Isbn::parse("9780547928227").unwrap();
    /// let mut collection = Collection::new();
    /// collection.add(Book::new("The Hobbit", "J.R.R. Tolkien", "Fantasy", isbn));
    /// assert_eq!(collection.books("Fantasy").len(), 1);
    /// ```
    pub fn add(&mut self, book: Book) {
        let bucket = self.genres.entry(book.genre().to_string()).or_default();
        bucket.push(book);
        bucket.sort_by(|a, b| a.author().cmp(b.author()));
    }

    /// Returns the books filed under `genre`, sorted by author.
    pub fn books(&self, genre: &str) -> &[Book] {
        self.genres.get(genre).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates over genres in alphabetical order with their books.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Book])> {
        self.genres
            .iter()
            .map(|(genre, books)| (genre.as_str(), books.as_slice()))
    }

    /// Total number of books across all genres.
    pub fn len(&self) -> usize {
        self.genres.values().map(Vec::len).sum()
    }

    /// Returns `true` if no book has been added yet.
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    /// Renders the collection as a grouped report.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(REPORT_TITLE);
        out.push('\n');
        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push_str("\n\n");

        for (genre, books) in self.iter() {
            out.push_str(genre);
            out.push_str(":\n");
            for book in books {
                out.push_str(&format!(
                    "{}{} - {} [{}]\n",
                    ENTRY_INDENT,
                    book.author(),
                    book.title(),
                    book.isbn()
                ));
            }
            out.push('\n');
        }

        out
    }

    /// Writes the full report to `path`, replacing any previous contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render())
            .with_context(|| format!("Failed to save collection to {}", path.display()))
    }

    /// Loads a collection previously written by [`save`](Self::save).
    ///
    /// A missing file yields an empty collection. Lines that cannot be
    /// understood are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read collection from {}", path.display()))?;

        let collection = Self::parse(&contents);
        tracing::info!(
            path = %path.display(),
            books = collection.len(),
            "loaded existing collection"
        );
        Ok(collection)
    }

    /// Parses report text back into a collection.
    pub fn parse(report: &str) -> Self {
        let mut collection = Self::new();
        let mut current_genre: Option<&str> = None;

        for (index, line) in report.lines().enumerate() {
            let line_no = index + 1;

            if line.trim().is_empty() || line == REPORT_TITLE || is_rule(line) {
                continue;
            }

            if let Some(entry) = line.strip_prefix(ENTRY_INDENT) {
                let Some(genre) = current_genre else {
                    tracing::warn!(line = line_no, "book entry outside of a genre, skipping");
                    continue;
                };
                match parse_entry(entry, genre) {
                    Some(book) => collection.add(book),
                    None => tracing::warn!(line = line_no, entry, "unreadable book entry, skipping"),
                }
            } else if let Some(genre) = line.strip_suffix(':') {
                current_genre = Some(genre);
            } else {
                tracing::warn!(line = line_no, "unexpected line in collection, skipping");
            }
        }

        collection
    }
}

fn is_rule(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c == '=')
}

/// Parses `author - title [isbn]`.
///
/// The ISBN is taken from the last bracket pair and the author ends at the
/// first `" - "`, so titles may contain either separator.
fn parse_entry(entry: &str, genre: &str) -> Option<Book> {
    let (rest, isbn) = entry.strip_suffix(']')?.rsplit_once(" [")?;
    let (author, title) = rest.split_once(" - ")?;
    let isbn = Isbn::parse(isbn)?;
    Some(Book::new(title, author, genre, isbn))
}

//! The scanning session: one ISBN in, one classified book out.
//!
//! [`Scanner`] owns the taxonomy and the collection for the lifetime of the
//! process. Each call to [`Scanner::process`] completes fully before the
//! next one starts, so state is always consistent between books and
//! [`Scanner::flush`] may run at any such boundary.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};

use crate::classifier::GenreClassifier;
use crate::collection::Collection;
use crate::models::{Book, Isbn};
use crate::remote::CatalogLookup;
use crate::taxonomy::Taxonomy;

/// Author recorded when the catalog lists none.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Result of processing one ISBN.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The book was found, classified and added to the collection.
    Added(Book),
    /// The catalog had no usable record; nothing was added.
    NotFound(Isbn),
}

/// Scanning session state.
pub struct Scanner {
    catalog: Arc<dyn CatalogLookup>,
    classifier: GenreClassifier,
    taxonomy: Taxonomy,
    collection: Collection,
    collection_path: Option<PathBuf>,
}

impl Scanner {
    /// Creates a scanner over the given state. The collection is not persisted
    /// unless [`with_collection_path`](Self::with_collection_path) is used.
    pub fn new(
        catalog: Arc<dyn CatalogLookup>,
        classifier: GenreClassifier,
        taxonomy: Taxonomy,
        collection: Collection,
    ) -> Self {
        Self {
            catalog,
            classifier,
            taxonomy,
            collection,
            collection_path: None,
        }
    }

    /// Sets the file the collection report is flushed to.
    pub fn with_collection_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.collection_path = Some(path.into());
        self
    }

    /// Opens a scanner backed by the given collection and genre files.
    ///
    /// The genre file is seeded when missing; an existing collection report
    /// is loaded so new books extend it.
    ///
    /// # Errors
    ///
    /// Returns an error if either file exists but cannot be read, or the
    /// seeded genre file cannot be written.
    pub fn open(
        collection_path: &Path,
        genres_path: &Path,
        catalog: Arc<dyn CatalogLookup>,
        classifier: GenreClassifier,
    ) -> Result<Self> {
        let taxonomy = Taxonomy::open(genres_path).context("Failed to load genres")?;
        let collection = Collection::load(collection_path).context("Failed to load collection")?;

        Ok(Self::new(catalog, classifier, taxonomy, collection)
            .with_collection_path(collection_path))
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Looks up, classifies and files one book.
    ///
    /// Lookup failures are logged and reported as [`ScanOutcome::NotFound`];
    /// they never abort the session.
    pub fn process(&mut self, isbn: &Isbn) -> ScanOutcome {
        let record = match self.catalog.lookup(isbn) {
            Ok(Some(record)) => record,
            Ok(None) => return ScanOutcome::NotFound(isbn.clone()),
            Err(e) => {
                tracing::warn!(%isbn, error = %e, "catalog lookup failed");
                return ScanOutcome::NotFound(isbn.clone());
            }
        };

        let author = record
            .author
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        let genre = self.classifier.classify(
            &record.title,
            &author,
            &record.subjects,
            &mut self.taxonomy,
        );

        let book = Book::new(record.title, author, genre, isbn.clone());
        self.collection.add(book.clone());
        ScanOutcome::Added(book)
    }

    /// Writes the collection report and the genre list.
    ///
    /// Idempotent; safe to call repeatedly and between any two books.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be written.
    pub fn flush(&self) -> Result<()> {
        if let Some(path) = &self.collection_path {
            self.collection.save(path)?;
        }
        self.taxonomy.save()?;
        tracing::debug!(books = self.collection.len(), "flushed collection and genres");
        Ok(())
    }
}

/// Locks the shared scanner, recovering the state if a holder panicked.
pub(crate) fn lock(scanner: &Mutex<Scanner>) -> std::sync::MutexGuard<'_, Scanner> {
    scanner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs the interactive prompt until `quit`, `exit` or end of input.
///
/// The scanner is locked only while a book is being processed, never while
/// waiting for input, so an interrupt handler can always reach it. The
/// session is flushed before returning.
///
/// # Errors
///
/// Returns an error on I/O failure or if the final flush fails.
pub fn run_interactive<R, W>(scanner: &Mutex<Scanner>, input: R, mut output: W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();

    'session: loop {
        write!(output, "Enter ISBN (scan or type manually, 'quit' to exit): ")?;
        output.flush()?;

        let isbn = loop {
            let Some(line) = lines.next() else {
                writeln!(output)?;
                break 'session;
            };
            let line = line.context("Failed to read input")?;
            let trimmed = line.trim();

            if trimmed == "quit" || trimmed == "exit" {
                break 'session;
            }

            match Isbn::parse(trimmed) {
                Some(isbn) => break isbn,
                None => {
                    write!(output, "Invalid ISBN format. Please try again: ")?;
                    output.flush()?;
                }
            }
        };

        writeln!(output, "Processing ISBN: {}...", isbn)?;
        let outcome = lock(scanner).process(&isbn);
        report_outcome(&mut output, &outcome)?;
        writeln!(output)?;
    }

    lock(scanner).flush()?;
    writeln!(output, "Collection and genres saved!")?;
    Ok(())
}

/// Prints the operator-facing result line for one ISBN.
///
/// # Errors
///
/// Returns an error if writing to `output` fails.
pub fn report_outcome<W: Write>(output: &mut W, outcome: &ScanOutcome) -> Result<()> {
    match outcome {
        ScanOutcome::Added(book) => writeln!(
            output,
            "Added \"{}\" by {} (genre: {})",
            book.title(),
            book.author(),
            book.genre()
        )?,
        ScanOutcome::NotFound(isbn) => {
            writeln!(output, "Could not find book data for ISBN: {}", isbn)?
        }
    }
    Ok(())
}

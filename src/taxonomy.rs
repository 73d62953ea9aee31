//! Persistent, append-only set of known genre labels.
//!
//! The taxonomy is stored as UTF-8 text with one label per line in insertion
//! order. Every mutation rewrites the whole file so the on-disk copy never
//! lags behind memory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Genres used when no taxonomy file exists yet.
pub const SEED_GENRES: [&str; 26] = [
    "Fantasy",
    "Science Fiction",
    "Mystery",
    "Thriller",
    "Romance",
    "Horror",
    "Historical Fiction",
    "Literary Fiction",
    "Young Adult",
    "Biography",
    "History",
    "Science",
    "Philosophy",
    "Self-Help",
    "Business",
    "Art",
    "Music",
    "Travel",
    "Cooking",
    "Technology",
    "Dark Romance",
    "Urban Fantasy",
    "Epic Fantasy",
    "Cyberpunk",
    "Steampunk",
    "Classic Literature",
];

/// Ordered, duplicate-free list of genre labels, optionally backed by a file.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    labels: Vec<String>,
    path: Option<PathBuf>,
}

impl Taxonomy {
    /// Creates a taxonomy seeded with [`SEED_GENRES`] that is never written to disk.
    pub fn in_memory() -> Self {
        Self::with_labels(SEED_GENRES)
    }

    /// Creates an in-memory taxonomy from the given labels.
    ///
    /// Labels are trimmed; blanks and repeats are dropped.
    pub fn with_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut taxonomy = Self {
            labels: Vec::new(),
            path: None,
        };
        for label in labels {
            taxonomy.push_unique(label.as_ref());
        }
        taxonomy
    }

    /// Opens the taxonomy stored at `path`.
    ///
    /// If the file does not exist, the seed genres are used and written to
    /// `path` straight away.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, or if the
    /// seeded file cannot be written.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::info!(path = %path.display(), "no genre file found, seeding defaults");
            let mut taxonomy = Self::in_memory();
            taxonomy.path = Some(path.to_path_buf());
            taxonomy.save()?;
            return Ok(taxonomy);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read genre file: {}", path.display()))?;

        let mut taxonomy = Self::with_labels(contents.lines());
        taxonomy.path = Some(path.to_path_buf());
        tracing::debug!(count = taxonomy.len(), "loaded genres");
        Ok(taxonomy)
    }

    /// Returns the labels in insertion order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns `true` if `label` is already known (exact match).
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|known| known == label)
    }

    /// Number of known genres, seeds included.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if no genre is known; a seeded store never is.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Appends `label` if it is new and persists the taxonomy immediately.
    ///
    /// Returns `Ok(true)` when the label was added, `Ok(false)` when it was
    /// blank or already present. The label stays in memory even if the write
    /// fails, so a later [`save`](Self::save) can still persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the taxonomy file cannot be rewritten.
    pub fn register(&mut self, label: &str) -> Result<bool> {
        if !self.push_unique(label) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Rewrites the backing file in full. No-op for in-memory taxonomies.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut contents = String::new();
        for label in &self.labels {
            contents.push_str(label);
            contents.push('\n');
        }

        fs::write(path, contents)
            .with_context(|| format!("Failed to write genre file: {}", path.display()))
    }

    fn push_unique(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.contains(label) {
            return false;
        }
        self.labels.push(label.to_string());
        true
    }
}

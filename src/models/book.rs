use serde::{Deserialize, Serialize};

use super::Isbn;

/// A resolved and classified book.
///
/// Books are created once per successful lookup and classification and are
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    title: String,
    author: String,
    genre: String,
    isbn: Isbn,
}

impl Book {
    /// Creates a new book.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelf::{Book, Isbn};
    ///
    /// let isbn = Isbn::parse("9780134685991").unwrap();
    /// let book = Book::new("Effective Java", "Joshua Bloch", "Technology", isbn);
    /// assert_eq!(book.author(), "Joshua Bloch");
    /// assert_eq!(book.genre(), "Technology");
    /// ```
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        isbn: Isbn,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            isbn,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Returns the genre bucket this book belongs to.
    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn isbn(&self) -> &Isbn {
        &self.isbn
    }
}

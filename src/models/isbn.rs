use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized ISBN-10 or ISBN-13.
///
/// Holds only decimal digits and upper-case `X`, with a length of exactly
/// 10 or 13 characters. Check digits are not verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isbn(String);

impl Isbn {
    /// Parses raw scanner or keyboard input into an `Isbn`.
    ///
    /// Returns `None` when the normalized form is not 10 or 13 characters long.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelf::Isbn;
    ///
    /// let isbn = Isbn::parse("0-13-468599-x").unwrap();
    /// assert_eq!(isbn.as_str(), "013468599X");
    /// assert!(Isbn::parse("abc").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_isbn(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// Returns the normalized identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalizes an ISBN string.
///
/// Drops every character that is neither a decimal digit nor `X`/`x`,
/// upper-cases the rest, and returns it if it is 10 or 13 characters long.
/// Any other length yields an empty string.
///
/// # Examples
///
/// ```
/// use shelf::normalize_isbn;
///
/// assert_eq!(normalize_isbn("978-0-13-468599-1"), "9780134685991");
/// assert_eq!(normalize_isbn("0-13-468599-X"), "013468599X");
/// assert_eq!(normalize_isbn("abc"), "");
/// ```
#[must_use]
pub fn normalize_isbn(raw: &str) -> String {
    let isbn: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if isbn.len() == 10 || isbn.len() == 13 {
        isbn
    } else {
        String::new()
    }
}

//! Genre inference and taxonomy management.
//!
//! Turns catalog text into a genre label in four steps:
//!
//! 1. [`SubjectExtractor`] picks up to three genre-bearing catalog subjects.
//! 2. A zero-shot classifier ranks the current taxonomy against the book
//!    (see [`crate::remote::ClassifierClientTrait`]).
//! 3. [`ResponseNormalizer`] reduces either response shape to ranked
//!    [`CandidateLabel`](crate::CandidateLabel)s.
//! 4. [`LabelResolver`] applies the specificity tie-break and registers
//!    newly discovered genres in the [`Taxonomy`](crate::Taxonomy).
//!
//! [`GenreClassifier`] runs the whole sequence for one book.
//!
//! # Examples
//!
//! ```
//! use shelf::classifier::{LabelResolver, ResponseNormalizer};
//! use shelf::Taxonomy;
//!
//! let mut taxonomy = Taxonomy::in_memory();
//! let raw = r#"{"labels": ["Horror", "Dark Romance"], "scores": [0.5, 0.45]}"#;
//!
//! let ranked = ResponseNormalizer::normalize(raw).unwrap();
//! assert_eq!(LabelResolver::resolve(&ranked, &mut taxonomy), "Dark Romance");
//! ```

mod genre;
mod resolver;
mod response;
mod subjects;

pub use genre::{GenreClassifier, GenreClassifierBuilder};
pub use resolver::{FALLBACK_GENRE, LabelResolver};
pub use response::{ResponseError, ResponseNormalizer};
pub use subjects::SubjectExtractor;

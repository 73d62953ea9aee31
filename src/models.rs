mod book;
mod candidate;
mod isbn;

pub use book::Book;
pub use candidate::CandidateLabel;
pub use isbn::{Isbn, normalize_isbn};

pub mod classifier;
pub mod collection;
pub mod models;
pub mod remote;
pub mod scanner;
pub mod shutdown;
pub mod taxonomy;
pub mod utils;

pub use collection::Collection;
pub use models::{Book, CandidateLabel, Isbn, normalize_isbn};
pub use scanner::{ScanOutcome, Scanner};
pub use taxonomy::Taxonomy;

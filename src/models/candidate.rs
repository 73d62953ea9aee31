use serde::{Deserialize, Serialize};

/// A genre label proposed by the classifier with its score.
///
/// Candidates arrive ranked by descending score; the ranking is owned by the
/// classifier and is never re-sorted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateLabel {
    pub label: String,
    pub score: f64,
}

impl CandidateLabel {
    /// Creates a new candidate.
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

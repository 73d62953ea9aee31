//! Normalization of zero-shot classifier payloads.
//!
//! The inference service answers in one of two shapes depending on the
//! deployment: parallel `labels`/`scores` arrays, or a list of
//! `{"label", "score"}` objects. Both are reduced here to a ranked list of
//! [`CandidateLabel`]s; nothing past this module sees the raw shape.

use serde::Deserialize;
use thiserror::Error;

use crate::models::CandidateLabel;

/// Errors produced while normalizing a classifier payload.
#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    /// Payload was empty, not JSON, or matched neither known shape.
    #[error("Malformed classifier response")]
    Malformed,

    /// The service replied with an explicit error object.
    #[error("Classifier service error: {message}")]
    Service { message: String },
}

/// Raw classifier payload, resolved by structure.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifierResponse {
    /// `{"labels": [...], "scores": [...]}`
    Ranked {
        labels: Vec<String>,
        scores: Vec<f64>,
    },
    /// `[{"label": ..., "score": ...}, ...]`
    PerItem(Vec<serde_json::Value>),
    /// `{"error": "..."}`
    Failure { error: String },
}

impl ClassifierResponse {
    fn into_ranked(self) -> Result<Vec<CandidateLabel>, ResponseError> {
        match self {
            Self::Ranked { labels, scores } => {
                if labels.is_empty() {
                    return Err(ResponseError::Malformed);
                }
                // Only labels with a score compete; the top label survives
                // alone (scored zero) when no scores were sent.
                let top_score = scores.first().copied().unwrap_or(0.0);
                let count = labels.len().min(scores.len()).max(1);
                Ok(labels
                    .into_iter()
                    .zip(scores.into_iter().chain(std::iter::once(top_score)))
                    .take(count)
                    .map(|(label, score)| CandidateLabel::new(label, score))
                    .collect())
            }
            Self::PerItem(items) => items
                .into_iter()
                .find_map(|item| serde_json::from_value::<CandidateLabel>(item).ok())
                .map(|first| vec![first])
                .ok_or(ResponseError::Malformed),
            Self::Failure { error } => Err(ResponseError::Service { message: error }),
        }
    }
}

/// Converts a raw classifier payload into ranked candidates.
pub struct ResponseNormalizer;

impl ResponseNormalizer {
    /// Normalizes `raw` into candidates ordered as the classifier ranked them.
    ///
    /// The ranked-lists shape is tried first and keeps every scored candidate. The
    /// per-item shape only yields its first well-formed item.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Malformed`] for empty or unrecognized payloads
    /// and [`ResponseError::Service`] when the service reported an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelf::classifier::ResponseNormalizer;
    ///
    /// let raw = r#"{"labels": ["Fiction", "Fantasy"], "scores": [0.6, 0.4]}"#;
    /// let ranked = ResponseNormalizer::normalize(raw).unwrap();
    /// assert_eq!(ranked[1].label, "Fantasy");
    ///
    /// assert!(ResponseNormalizer::normalize("").is_err());
    /// ```
    pub fn normalize(raw: &str) -> Result<Vec<CandidateLabel>, ResponseError> {
        if raw.trim().is_empty() {
            return Err(ResponseError::Malformed);
        }

        let response: ClassifierResponse =
            serde_json::from_str(raw).map_err(|_| ResponseError::Malformed)?;

        response.into_ranked()
    }
}

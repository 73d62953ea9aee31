//! Genre inference for a looked-up book.
//!
//! Glues the pieces together: subject context, a zero-shot classifier call
//! over the current taxonomy, payload normalization and label resolution.

use std::sync::Arc;

use crate::remote::{ClassificationRequest, ClassifierClientTrait};
use crate::taxonomy::Taxonomy;

use super::resolver::{FALLBACK_GENRE, LabelResolver};
use super::response::ResponseNormalizer;
use super::subjects::SubjectExtractor;

/// Builder for [`GenreClassifier`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use shelf::classifier::GenreClassifierBuilder;
/// use shelf::remote::ClassifierClientBuilder;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ClassifierClientBuilder::new().build()?;
/// let classifier = GenreClassifierBuilder::new()
///     .client(Arc::new(client))
///     .build();
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct GenreClassifierBuilder {
    client: Option<Arc<dyn ClassifierClientTrait>>,
}

impl GenreClassifierBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the classifier client used for inference.
    pub fn client(mut self, client: Arc<dyn ClassifierClientTrait>) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the `GenreClassifier`.
    ///
    /// # Panics
    ///
    /// Panics if `client()` was not called before `build()`.
    #[must_use]
    pub fn build(self) -> GenreClassifier {
        GenreClassifier {
            client: self.client.expect("client must be set via client() method"),
        }
    }
}

/// Infers a genre for a book from its title, author and catalog subjects.
pub struct GenreClassifier {
    client: Arc<dyn ClassifierClientTrait>,
}

impl GenreClassifier {
    #[must_use]
    pub fn new(client: Arc<dyn ClassifierClientTrait>) -> Self {
        Self { client }
    }

    /// Classifies a book and returns its genre.
    ///
    /// The whole taxonomy is offered as candidate labels. Transport failures
    /// and malformed payloads yield `"General"` without touching the
    /// taxonomy; otherwise a newly seen label is registered in it.
    pub fn classify(
        &self,
        title: &str,
        author: &str,
        subjects: &[String],
        taxonomy: &mut Taxonomy,
    ) -> String {
        let context = SubjectExtractor::extract(subjects);
        let request = ClassificationRequest::new(
            build_input_text(title, author, &context),
            taxonomy.labels().to_vec(),
        );
        tracing::debug!(text = request.text(), "classifying genre");

        let raw = match self.client.classify(&request) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "classifier request failed");
                return FALLBACK_GENRE.to_string();
            }
        };

        match ResponseNormalizer::normalize(&raw) {
            Ok(ranked) => LabelResolver::resolve(&ranked, taxonomy),
            Err(e) => {
                tracing::warn!(error = %e, "unusable classifier response");
                FALLBACK_GENRE.to_string()
            }
        }
    }
}

/// Builds the sentence handed to the classifier.
fn build_input_text(title: &str, author: &str, context: &str) -> String {
    let mut text = format!("The book '{}' by {}", title, author);
    if !context.is_empty() {
        text.push_str(&format!(" (subjects: {})", context));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::remote::RemoteError;

    /// Replies with a canned body and records each request.
    struct MockClassifier {
        response: Result<String, u16>,
        requests: Mutex<Vec<ClassificationRequest>>,
    }

    impl MockClassifier {
        fn replying(body: &str) -> Self {
            Self {
                response: Ok(body.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                response: Err(status),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl ClassifierClientTrait for MockClassifier {
        fn classify(&self, request: &ClassificationRequest) -> Result<String, RemoteError> {
            self.requests.lock().unwrap().push(request.clone());
            self.response
                .clone()
                .map_err(|status| RemoteError::Http { status })
        }
    }

    fn subjects(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_input_text_includes_subject_context_when_present() {
        assert_eq!(
            build_input_text("Dune", "Frank Herbert", "science fiction"),
            "The book 'Dune' by Frank Herbert (subjects: science fiction)"
        );
        assert_eq!(
            build_input_text("Dune", "Frank Herbert", ""),
            "The book 'Dune' by Frank Herbert"
        );
    }

    #[test]
    fn test_request_offers_whole_taxonomy_as_candidates() {
        let mock = Arc::new(MockClassifier::replying(
            r#"{"labels": ["Horror"], "scores": [0.9]}"#,
        ));
        let classifier = GenreClassifier::new(mock.clone());
        let mut taxonomy = Taxonomy::with_labels(["Horror", "Romance"]);

        classifier.classify(
            "It",
            "Stephen King",
            &subjects(&["Horror tales", "Maine"]),
            &mut taxonomy,
        );

        let requests = mock.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].candidate_labels(), &["Horror", "Romance"]);
        assert_eq!(
            requests[0].text(),
            "The book 'It' by Stephen King (subjects: horror tales)"
        );
    }

    #[test]
    fn test_ranked_response_goes_through_tie_break() {
        let mock = Arc::new(MockClassifier::replying(
            r#"{"labels": ["Fiction", "Fantasy", "Mystery"], "scores": [0.5, 0.4, 0.1]}"#,
        ));
        let classifier = GenreClassifier::new(mock);
        let mut taxonomy = Taxonomy::in_memory();

        let genre = classifier.classify("The Hobbit", "J.R.R. Tolkien", &[], &mut taxonomy);

        assert_eq!(genre, "Fantasy");
    }

    #[test]
    fn test_per_item_response_cannot_trigger_tie_break() {
        let mock = Arc::new(MockClassifier::replying(
            r#"[{"label": "Fiction", "score": 0.5}, {"label": "Fantasy", "score": 0.4}]"#,
        ));
        let classifier = GenreClassifier::new(mock);
        let mut taxonomy = Taxonomy::in_memory();

        let genre = classifier.classify("The Hobbit", "J.R.R. Tolkien", &[], &mut taxonomy);

        assert_eq!(genre, "Fiction");
        assert!(taxonomy.contains("Fiction"));
    }

    #[test]
    fn test_malformed_response_falls_back_without_mutation() {
        let mock = Arc::new(MockClassifier::replying("<html>Service Unavailable</html>"));
        let classifier = GenreClassifier::new(mock);
        let mut taxonomy = Taxonomy::in_memory();

        let genre = classifier.classify("Dune", "Frank Herbert", &[], &mut taxonomy);

        assert_eq!(genre, "General");
        assert_eq!(taxonomy.labels(), Taxonomy::in_memory().labels());
    }

    #[test]
    fn test_transport_failure_falls_back_to_general() {
        let mock = Arc::new(MockClassifier::failing(503));
        let classifier = GenreClassifier::new(mock);
        let mut taxonomy = Taxonomy::in_memory();

        let genre = classifier.classify("Dune", "Frank Herbert", &[], &mut taxonomy);

        assert_eq!(genre, "General");
        assert_eq!(taxonomy.len(), 26);
    }

    #[test]
    fn test_builder_sets_client() {
        let mock = Arc::new(MockClassifier::replying(r#"[{"label": "Art", "score": 0.7}]"#));
        let classifier = GenreClassifierBuilder::new().client(mock).build();
        let mut taxonomy = Taxonomy::in_memory();

        assert_eq!(classifier.classify("t", "a", &[], &mut taxonomy), "Art");
    }

    #[test]
    #[should_panic(expected = "client must be set")]
    fn test_builder_without_client_panics() {
        let _ = GenreClassifierBuilder::new().build();
    }
}

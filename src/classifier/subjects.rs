/// Keywords that mark a catalog subject as a useful genre hint.
const GENRE_KEYWORDS: [&str; 12] = [
    "romance",
    "dark",
    "fantasy",
    "science fiction",
    "mystery",
    "thriller",
    "horror",
    "classic",
    "literature",
    "historical",
    "biography",
    "young adult",
];

/// Maximum number of subjects forwarded to the classifier.
const MAX_SUBJECTS: usize = 3;

/// Reduces free-form catalog subjects to a short classification context.
pub struct SubjectExtractor;

impl SubjectExtractor {
    /// Builds the subject context for a book.
    ///
    /// Subjects are lower-cased and kept when they contain one of the genre
    /// keywords. The first three matches, in catalog order, are joined with
    /// `", "`. The lower-cased text is what gets returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelf::classifier::SubjectExtractor;
    ///
    /// let subjects = ["Fiction", "Dark Fantasy", "Vampires", "Horror tales"];
    /// assert_eq!(SubjectExtractor::extract(&subjects), "dark fantasy, horror tales");
    /// assert_eq!(SubjectExtractor::extract(&["Cooking"]), "");
    /// ```
    #[must_use]
    pub fn extract<S: AsRef<str>>(subjects: &[S]) -> String {
        subjects
            .iter()
            .map(|subject| subject.as_ref().to_lowercase())
            .filter(|subject| GENRE_KEYWORDS.iter().any(|kw| subject.contains(kw)))
            .take(MAX_SUBJECTS)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

use crate::models::CandidateLabel;
use crate::taxonomy::Taxonomy;

/// Label used whenever no usable genre could be determined.
pub const FALLBACK_GENRE: &str = "General";

/// Largest score gap at which a more specific runner-up may replace the top label.
const OVERRIDE_MARGIN: f64 = 0.25;

/// Number of leading candidates considered, including the top one.
const OVERRIDE_WINDOW: usize = 5;

/// Picks the final genre from ranked candidates and grows the taxonomy.
pub struct LabelResolver;

impl LabelResolver {
    /// Resolves ranked candidates to a single genre.
    ///
    /// The top candidate wins unless one of the next four candidates scores
    /// within 0.25 of it and is a more specific form of the same genre
    /// (see [`is_more_specific`](Self::is_more_specific)). The first such
    /// candidate replaces the top one.
    ///
    /// A resolved label missing from `taxonomy` is appended and persisted.
    /// Persistence failures are logged; the label is still returned. Empty
    /// input or a blank label resolves to `"General"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelf::classifier::LabelResolver;
    /// use shelf::{CandidateLabel, Taxonomy};
    ///
    /// let mut taxonomy = Taxonomy::in_memory();
    /// let ranked = vec![
    ///     CandidateLabel::new("Fiction", 0.50),
    ///     CandidateLabel::new("Fantasy", 0.40),
    ///     CandidateLabel::new("Mystery", 0.10),
    /// ];
    /// assert_eq!(LabelResolver::resolve(&ranked, &mut taxonomy), "Fantasy");
    /// ```
    pub fn resolve(ranked: &[CandidateLabel], taxonomy: &mut Taxonomy) -> String {
        let Some(mut top) = ranked.first() else {
            return FALLBACK_GENRE.to_string();
        };

        let window = ranked.len().min(OVERRIDE_WINDOW);
        for alt in &ranked[1..window] {
            if top.score - alt.score < OVERRIDE_MARGIN
                && Self::is_more_specific(&top.label, &alt.label)
            {
                tracing::info!(
                    chosen = %alt.label,
                    over = %top.label,
                    "choosing more specific genre"
                );
                top = alt;
                break;
            }
        }

        let genre = top.label.trim();
        if genre.is_empty() {
            return FALLBACK_GENRE.to_string();
        }

        if genre != FALLBACK_GENRE && !taxonomy.contains(genre) {
            match taxonomy.register(genre) {
                Ok(_) => tracing::info!(genre, "new genre added"),
                Err(e) => tracing::warn!(genre, error = %e, "failed to persist new genre"),
            }
        }

        genre.to_string()
    }

    /// Returns `true` if `alt` should be preferred over `top` when their scores are close.
    ///
    /// ```
    /// use shelf::classifier::LabelResolver;
    ///
    /// assert!(LabelResolver::is_more_specific("Horror", "Dark Romance"));
    /// assert!(LabelResolver::is_more_specific("Fiction", "Urban Fantasy"));
    /// assert!(!LabelResolver::is_more_specific("Horror", "Thriller"));
    /// ```
    #[must_use]
    pub fn is_more_specific(top: &str, alt: &str) -> bool {
        match top {
            "Horror" => alt == "Dark Romance",
            "Literary Fiction" => alt == "Classic Literature",
            "Fiction" => ["Romance", "Fantasy", "Science Fiction"]
                .iter()
                .any(|genre| alt.contains(genre)),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(pairs: &[(&str, f64)]) -> Vec<CandidateLabel> {
        pairs
            .iter()
            .map(|(label, score)| CandidateLabel::new(*label, *score))
            .collect()
    }

    #[test]
    fn test_empty_candidates_resolve_to_general() {
        let mut taxonomy = Taxonomy::in_memory();

        assert_eq!(LabelResolver::resolve(&[], &mut taxonomy), "General");
        assert_eq!(taxonomy.len(), 26);
    }

    #[test]
    fn test_fiction_yields_to_close_fantasy() {
        let mut taxonomy = Taxonomy::in_memory();
        let candidates = ranked(&[("Fiction", 0.50), ("Fantasy", 0.40), ("Mystery", 0.10)]);

        assert_eq!(LabelResolver::resolve(&candidates, &mut taxonomy), "Fantasy");
    }

    #[test]
    fn test_no_override_for_unrelated_runner_up() {
        let mut taxonomy = Taxonomy::in_memory();
        let candidates = ranked(&[("Horror", 0.90), ("Thriller", 0.10)]);

        assert_eq!(LabelResolver::resolve(&candidates, &mut taxonomy), "Horror");
    }

    #[test]
    fn test_horror_yields_to_dark_romance_within_margin() {
        let mut taxonomy = Taxonomy::in_memory();
        let candidates = ranked(&[("Horror", 0.45), ("Thriller", 0.30), ("Dark Romance", 0.25)]);

        assert_eq!(
            LabelResolver::resolve(&candidates, &mut taxonomy),
            "Dark Romance"
        );
    }

    #[test]
    fn test_literary_fiction_yields_to_classic_literature() {
        let mut taxonomy = Taxonomy::in_memory();
        let candidates = ranked(&[("Literary Fiction", 0.40), ("Classic Literature", 0.39)]);

        assert_eq!(
            LabelResolver::resolve(&candidates, &mut taxonomy),
            "Classic Literature"
        );
    }

    #[test]
    fn test_gap_of_margin_or_more_blocks_override() {
        let mut taxonomy = Taxonomy::in_memory();
        let candidates = ranked(&[("Fiction", 0.75), ("Fantasy", 0.25)]);

        assert_eq!(LabelResolver::resolve(&candidates, &mut taxonomy), "Fiction");
    }

    #[test]
    fn test_first_matching_alternate_wins() {
        let mut taxonomy = Taxonomy::in_memory();
        let candidates = ranked(&[
            ("Fiction", 0.40),
            ("Mystery", 0.30),
            ("Science Fiction", 0.25),
            ("Romance", 0.24),
        ]);

        assert_eq!(
            LabelResolver::resolve(&candidates, &mut taxonomy),
            "Science Fiction"
        );
    }

    #[test]
    fn test_only_four_alternates_are_scanned() {
        let mut taxonomy = Taxonomy::in_memory();
        let candidates = ranked(&[
            ("Fiction", 0.30),
            ("Mystery", 0.20),
            ("Thriller", 0.20),
            ("Horror", 0.15),
            ("History", 0.10),
            ("Fantasy", 0.05),
        ]);

        assert_eq!(LabelResolver::resolve(&candidates, &mut taxonomy), "Fiction");
    }

    #[test]
    fn test_fourth_alternate_can_still_override() {
        let mut taxonomy = Taxonomy::in_memory();
        let candidates = ranked(&[
            ("Fiction", 0.30),
            ("Mystery", 0.20),
            ("Thriller", 0.20),
            ("Horror", 0.15),
            ("Fantasy", 0.10),
        ]);

        assert_eq!(LabelResolver::resolve(&candidates, &mut taxonomy), "Fantasy");
    }

    #[test]
    fn test_override_does_not_chain() {
        let mut taxonomy = Taxonomy::with_labels(["Fiction"]);
        // After switching to "Dark Romance" no further rule is evaluated.
        let candidates = ranked(&[("Fiction", 0.40), ("Dark Romance", 0.35), ("Horror", 0.30)]);

        assert_eq!(
            LabelResolver::resolve(&candidates, &mut taxonomy),
            "Dark Romance"
        );
    }

    #[test]
    fn test_new_label_is_trimmed_and_registered() {
        let mut taxonomy = Taxonomy::in_memory();
        let candidates = ranked(&[("  Cozy Mystery \n", 0.8)]);

        assert_eq!(
            LabelResolver::resolve(&candidates, &mut taxonomy),
            "Cozy Mystery"
        );
        assert_eq!(taxonomy.len(), 27);
        assert_eq!(taxonomy.labels().last().unwrap(), "Cozy Mystery");
    }

    #[test]
    fn test_resolving_known_label_twice_does_not_duplicate() {
        let mut taxonomy = Taxonomy::in_memory();
        let candidates = ranked(&[("Poetry", 0.8)]);

        LabelResolver::resolve(&candidates, &mut taxonomy);
        LabelResolver::resolve(&candidates, &mut taxonomy);

        let count = taxonomy.labels().iter().filter(|l| *l == "Poetry").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_general_is_never_registered() {
        let mut taxonomy = Taxonomy::in_memory();
        let candidates = ranked(&[("General", 0.9)]);

        assert_eq!(LabelResolver::resolve(&candidates, &mut taxonomy), "General");
        assert!(!taxonomy.contains("General"));
    }

    #[test]
    fn test_blank_label_resolves_to_general() {
        let mut taxonomy = Taxonomy::in_memory();
        let candidates = ranked(&[("   ", 0.9)]);

        assert_eq!(LabelResolver::resolve(&candidates, &mut taxonomy), "General");
        assert_eq!(taxonomy.len(), 26);
    }

    #[test]
    fn test_override_rules_use_exact_top_label() {
        assert!(!LabelResolver::is_more_specific("horror", "Dark Romance"));
        assert!(!LabelResolver::is_more_specific("Literary Fiction", "Classic"));
        assert!(LabelResolver::is_more_specific("Fiction", "Paranormal Romance"));
        assert!(!LabelResolver::is_more_specific("Fiction", "Mystery"));
    }
}

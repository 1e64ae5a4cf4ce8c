//! Case-insensitive subsequence matching.
//!
//! Every query character must be found in the candidate, in order, at
//! strictly increasing positions. Each query character takes the first
//! occurrence after the previous match and a miss fails the whole match,
//! so the alignment found is the leftmost greedy one.

use fuzzy_matcher::FuzzyMatcher;

/// Whether `query` is a case-insensitive subsequence of `candidate`.
///
/// The empty query matches everything.
pub fn matches(candidate: &str, query: &str) -> bool {
    match_positions(candidate, query).is_some()
}

/// Character indices in `candidate` where each query character matched.
///
/// Returns `None` when the query is not a subsequence.
pub fn match_positions(candidate: &str, query: &str) -> Option<Vec<usize>> {
    let mut hay = candidate
        .chars()
        .enumerate()
        .flat_map(|(index, c)| c.to_lowercase().map(move |lower| (index, lower)));

    let mut positions: Vec<usize> = Vec::new();
    for needle in query.chars().flat_map(char::to_lowercase) {
        let (index, _) = hay.by_ref().find(|&(_, c)| c == needle)?;
        if positions.last() != Some(&index) {
            positions.push(index);
        }
    }
    Some(positions)
}

/// `FuzzyMatcher` adapter for the greedy subsequence test.
///
/// Accept/reject only: every match scores zero, so a stable sort by score
/// keeps the original order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsequenceMatcher;

impl FuzzyMatcher for SubsequenceMatcher {
    fn fuzzy_indices(&self, choice: &str, pattern: &str) -> Option<(i64, Vec<usize>)> {
        match_positions(choice, pattern).map(|positions| (0, positions))
    }

    fn fuzzy_match(&self, choice: &str, pattern: &str) -> Option<i64> {
        matches(choice, pattern).then_some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsequence_across_words() {
        assert!(matches("hello world", "hw"));
    }

    #[test]
    fn test_order_matters() {
        assert!(!matches("hello", "oe"));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(matches("anything", ""));
        assert!(matches("", ""));
    }

    #[test]
    fn test_empty_candidate() {
        assert!(!matches("", "a"));
    }

    #[test]
    fn test_query_longer_than_candidate() {
        assert!(!matches("ab", "abc"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(matches("/Notes/Journal.MD", "notesjmd"));
        assert!(matches("readme", "README"));
    }

    #[test]
    fn test_repeated_characters_need_distinct_positions() {
        assert!(matches("aa", "aa"));
        assert!(!matches("a", "aa"));
    }

    #[test]
    fn test_positions_are_leftmost_greedy() {
        // "ab" could align to (3, 4) but the greedy scan takes the first a
        assert_eq!(match_positions("axxab", "ab"), Some(vec![0, 4]));
        assert_eq!(match_positions("hello world", "lo"), Some(vec![2, 4]));
    }

    #[test]
    fn test_fuzzy_matcher_adapter() {
        let matcher = SubsequenceMatcher;
        assert_eq!(matcher.fuzzy_match("hello world", "hw"), Some(0));
        assert_eq!(matcher.fuzzy_match("hello", "oe"), None);
        assert_eq!(
            matcher.fuzzy_indices("hello world", "hw"),
            Some((0, vec![0, 6]))
        );
    }
}

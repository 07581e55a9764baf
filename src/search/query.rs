use regex::{Regex, RegexBuilder};

use super::matcher::escape;

/// The frontend encodes the space between keywords as a literal `%20`.
/// Splitting happens on that sequence only; a raw space inside the query is
/// part of the term, not a delimiter.
const TERM_DELIMITER: &str = "%20";

/// A parsed search query: one compiled case-insensitive literal pattern per
/// term. Parse once per keystroke, then apply to many haystacks.
pub struct Query {
    terms: Vec<Regex>,
}

impl Query {
    /// Parse a raw query string. Returns `None` when the query is empty after
    /// trimming, which callers treat as "no active search".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let terms = trimmed
            .split(TERM_DELIMITER)
            .map(|term| {
                RegexBuilder::new(&escape(term))
                    .case_insensitive(true)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            // Escaped literals always compile; a failure degrades to inactive
            .ok()?;

        Some(Self { terms })
    }

    /// A haystack matches when every term of the query appears in it.
    pub fn matches(&self, haystack: &str) -> bool {
        self.terms.iter().all(|re| re.is_match(haystack))
    }
}

/// String-level convenience form of [`Query::matches`]. An empty or
/// whitespace-only query has no terms, so the AND over them is vacuously
/// true; callers are expected to gate such queries out beforehand.
pub fn matches(query: &str, haystack: &str) -> bool {
    match Query::parse(query) {
        Some(parsed) => parsed.matches(haystack),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_term() {
        assert!(matches("docker", "Docker UI for the homelab"));
        assert!(!matches("docker", "kubernetes dashboard"));
    }

    #[test]
    fn test_query_is_trimmed() {
        assert!(matches("  docker  ", "a docker ui"));
        assert!(Query::parse("   ").is_none());
        assert!(Query::parse("").is_none());
        assert!(Query::parse("\t\n").is_none());
    }

    #[test]
    fn test_multi_term_and_semantics() {
        // Both terms must appear, in either order
        assert!(matches("foo%20bar", "foobar description"));
        assert!(matches("foo%20bar", "bar then foo"));
        assert!(!matches("foo%20bar", "only foo here"));
        assert!(!matches("foo%20bar", "only bar here"));
    }

    #[test]
    fn test_every_delimiter_occurrence_splits() {
        assert!(matches("a%20b%20c", "c b a"));
        assert!(!matches("a%20b%20c", "a b only"));
    }

    #[test]
    fn test_raw_space_is_one_term() {
        // No %20 delimiter: the space belongs to the term
        assert!(matches("docker ui", "my docker ui app"));
        assert!(!matches("docker ui", "ui for docker"));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(matches("ABC", "xabcx"), matches("abc", "xabcx"));
        assert!(matches("ABC", "xabcx"));
    }

    #[test]
    fn test_empty_query_is_vacuously_true() {
        assert!(matches("", "anything"));
        assert!(matches("   ", "anything"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        assert!(matches("c++%20(dev)", "my (dev) notes on c++"));
        assert!(!matches("a.c", "abc"));
    }
}

use regex::RegexBuilder;

/// Escape a user-supplied string so it only ever matches itself when used as
/// a pattern. Total over all inputs; the empty string stays empty.
pub fn escape(raw: &str) -> String {
    regex::escape(raw)
}

/// Case-insensitive substring containment of a single search term.
/// The term is escaped first, so metacharacters are matched literally.
/// An empty term matches any haystack.
pub fn term_matches(term: &str, haystack: &str) -> bool {
    match RegexBuilder::new(&escape(term))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.is_match(haystack),
        // An escaped literal always compiles; treat a failure as no match
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_is_identity_on_plain_text() {
        assert_eq!(escape("portainer"), "portainer");
        assert_eq!(escape("Grafana9"), "Grafana9");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_escape_neutralizes_metacharacters() {
        let escaped = escape("a.b*c");
        assert_ne!(escaped, "a.b*c");
        assert!(term_matches("a.b*c", "xx a.b*c yy"));
        // The dot must not act as a wildcard once escaped
        assert!(!term_matches("a.b", "aXb"));
    }

    #[test]
    fn test_metacharacter_terms_match_themselves() {
        for term in [". * + ? ( ) [ ] { } | ^ $ \\", "c++", "what?", "[dev]", "$(id)"] {
            assert!(term_matches(term, term), "self-match failed for {term:?}");
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert!(term_matches("ABC", "xabcx"));
        assert!(term_matches("abc", "xABCx"));
        assert!(term_matches("Docker", "a docker ui"));
    }

    #[test]
    fn test_empty_term_matches_anything() {
        assert!(term_matches("", ""));
        assert!(term_matches("", "anything at all"));
    }

    #[test]
    fn test_unicode_and_control_input_do_not_panic() {
        assert!(term_matches("héllo", "well héllo there"));
        assert!(term_matches("日本語", "日本語のテキスト"));
        assert!(!term_matches("héllo", "hello"));
        assert!(term_matches("a\tb", "x a\tb y"));
        assert!(!term_matches("\u{1}", "plain"));
    }
}

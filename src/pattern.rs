//! Client-supplied lemma patterns
//!
//! Patterns arrive straight from the URL, so compilation is allowed to fail.
//! A pattern that does not compile degrades to matching every lemma instead
//! of failing the request.

use regex::{Regex, RegexBuilder};

use crate::Error;

/// Upper bound on the compiled program size of a client pattern
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// A compiled lookup pattern
#[derive(Debug, Clone)]
pub enum LemmaPattern {
    Regex(Regex),
    MatchAll,
}

impl LemmaPattern {
    /// Compile `source`, falling back to [`LemmaPattern::MatchAll`] on error
    pub fn compile(source: &str) -> Self {
        match Self::try_compile(source) {
            Ok(pattern) => pattern,
            Err(e) => {
                tracing::debug!("{}; matching all lemmas", e);
                LemmaPattern::MatchAll
            }
        }
    }

    /// Compile `source` without the fallback
    pub fn try_compile(source: &str) -> crate::Result<Self> {
        if source.is_empty() {
            return Ok(LemmaPattern::MatchAll);
        }

        RegexBuilder::new(source)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
            .map(LemmaPattern::Regex)
            .map_err(|e| Error::InvalidPattern(format!("{:?}: {}", source, e)))
    }

    /// Search semantics: any match inside the lemma counts
    pub fn is_match(&self, lemma: &str) -> bool {
        match self {
            LemmaPattern::Regex(re) => re.is_match(lemma),
            LemmaPattern::MatchAll => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_search() {
        let pattern = LemmaPattern::compile("at");
        assert!(pattern.is_match("cat"));
        assert!(pattern.is_match("attic"));
        assert!(!pattern.is_match("run"));
    }

    #[test]
    fn test_anchors_are_respected() {
        let pattern = LemmaPattern::compile("^c");
        assert!(pattern.is_match("cat"));
        assert!(!pattern.is_match("arc"));

        let pattern = LemmaPattern::compile("un$");
        assert!(pattern.is_match("run"));
        assert!(!pattern.is_match("under"));
    }

    #[test]
    fn test_invalid_pattern_matches_everything() {
        for source in ["[", "(", "a{2,1}", "*"] {
            let pattern = LemmaPattern::compile(source);
            assert!(matches!(pattern, LemmaPattern::MatchAll), "{source}");
            assert!(pattern.is_match("cat"));
            assert!(pattern.is_match(""));
        }
    }

    #[test]
    fn test_unsupported_syntax_falls_back() {
        // backreferences are not supported by the regex crate
        assert!(matches!(LemmaPattern::compile(r"(a)\1"), LemmaPattern::MatchAll));
    }

    #[test]
    fn test_try_compile_reports_error() {
        let err = LemmaPattern::try_compile("[").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern(_)));
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        let pattern = LemmaPattern::compile("");
        assert!(pattern.is_match("anything"));
    }
}

//! Text patterns for name and status queries.

use regex::Regex;

/// An unanchored, case-sensitive regular expression.
///
/// A plain word therefore behaves as a substring match, and the empty
/// pattern matches everything.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex compile error when `source` is not a valid
    /// regular expression.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    /// Returns the original expression.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns `true` if the pattern matches anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("do", "to-do", true)]
    #[case("do", "done", true)]
    #[case("^done$", "done", true)]
    #[case("^do", "to-do", false)]
    #[case("Task", "task 1", false)]
    #[case("", "anything", true)]
    fn test_pattern_is_match(#[case] source: &str, #[case] text: &str, #[case] expected: bool) {
        let pattern = Pattern::new(source).unwrap();
        assert_eq!(pattern.is_match(text), expected);
    }

    #[rstest]
    fn test_pattern_rejects_invalid_regex() {
        assert!(Pattern::new("(unclosed").is_err());
    }
}

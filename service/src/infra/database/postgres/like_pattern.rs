//! [`LikePattern`] definition.

use derive_more::Display;
use postgres_types::{FromSql, ToSql};

/// `LIKE` pattern matching any text containing a literal substring.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct LikePattern(String);

impl LikePattern {
    /// Creates a [`LikePattern`] matching texts containing the `needle`.
    #[must_use]
    pub fn contains(needle: &str) -> Self {
        let escaped = needle
            .replace('\\', r"\\")
            .replace('%', r"\%")
            .replace('_', r"\_");
        Self(format!("%{escaped}%"))
    }
}

#[cfg(test)]
mod spec {
    use super::LikePattern;

    #[test]
    fn escapes_wildcards() {
        assert_eq!(LikePattern::contains("rugby").to_string(), "%rugby%");
        assert_eq!(
            LikePattern::contains(r"5%_\").to_string(),
            r"%5\%\_\\%",
        );
    }
}

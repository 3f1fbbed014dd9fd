// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Literal quoting and full-text escaping for the textual query backend.
//!
//! Two distinct rules, applied exactly once at leaf-value insertion time:
//!
//! - [`quote`] wraps a literal in single quotes for equality/LIKE clauses,
//!   doubling any embedded single quote so the literal cannot break out of
//!   the statement.
//! - [`escape_full_text`] rewrites characters that are special to the
//!   full-text search grammar. It is applied only to CONTAINS terms, never
//!   to equality literals.

/// Quote a literal for the textual backend.
///
/// A single quote inside the search value must be escaped with an additional
/// single quote or the expression breaks.
///
/// ```
/// use catalog_search::escape::quote;
/// assert_eq!(quote("men's"), "'men''s'");
/// ```
pub fn quote(input: &str) -> String {
    format!("'{}'", escape_single_quote(input))
}

/// Double every single quote without adding the surrounding quotes.
pub fn escape_single_quote(input: &str) -> String {
    input.replace('\'', "''")
}

/// Escape characters that are special within a full-text search literal.
///
/// Within the search literal, instances of double quote and hyphen must be
/// escaped with a backslash; backslash itself must therefore also be escaped,
/// ending up as a double backslash. Characters outside the fixed table pass
/// through untouched.
pub fn escape_full_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    for c in input.chars() {
        match c {
            '"' => out.push_str("\"\\\"\""),
            '-' => out.push_str("\"\\-\""),
            '\\' => out.push_str("\"\\\\\""),
            '#' => out.push_str("\"\\#\""),
            '^' => out.push_str("\"\\^\""),
            '(' => out.push_str("\"\\(\""),
            ')' => out.push_str("\"\\)\""),
            '{' => out.push_str("\"\\{\""),
            '}' => out.push_str("\"\\}\""),
            ']' => out.push_str("\"\\]\""),
            '[' => out.push_str("\"\\[\""),
            '&' => out.push_str("\"\\&\""),
            '.' => out.push_str("\\."),
            '?' => out.push_str("\"\\?\""),
            '*' => out.push_str("\"\\*\""),
            '\'' => out.push_str("\\''"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote("alpine"), "'alpine'");
    }

    #[test]
    fn test_quote_doubles_single_quote() {
        assert_eq!(quote("men's"), "'men''s'");
        assert_eq!(quote("''"), "''''''");
    }

    #[test]
    fn test_quote_empty() {
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn test_escape_single_quote_round_trip() {
        let escaped = escape_single_quote("o'brien's");
        assert_eq!(escaped, "o''brien''s");
        assert_eq!(escaped.replace("''", "'"), "o'brien's");
    }

    #[test]
    fn test_full_text_passthrough() {
        assert_eq!(escape_full_text("plain words"), "plain words");
    }

    #[test]
    fn test_full_text_apostrophe() {
        assert_eq!(escape_full_text("men's"), "men\\''s");
    }

    #[test]
    fn test_full_text_hyphen_and_backslash() {
        assert_eq!(escape_full_text("a-b"), "a\"\\-\"b");
        assert_eq!(escape_full_text("a\\b"), "a\"\\\\\"b");
    }

    #[test]
    fn test_full_text_dot_and_wildcard() {
        assert_eq!(escape_full_text("v1.2"), "v1\\.2");
        assert_eq!(escape_full_text("a*b?"), "a\"\\*\"b\"\\?\"");
    }

    #[test]
    fn test_full_text_brackets() {
        assert_eq!(
            escape_full_text("[x]{y}(z)"),
            "\"\\[\"x\"\\]\"\"\\{\"y\"\\}\"\"\\(\"z\"\\)\""
        );
    }
}

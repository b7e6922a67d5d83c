// SPDX-License-Identifier: MPL-2.0

//! Quote-aware splitting of OSGi manifest header values.
//!
//! A header value is a comma-separated list of *clauses*; each clause is a
//! semicolon-separated list of *tokens*; each token is either a bare name, a
//! `name=value` parameter, or a `name:=value` directive. Commas inside a
//! double-quoted region do not end a clause, and quotes are stripped from a
//! token's value once it has been lexed.
//!
//! These are free functions rather than methods on a stateful type: none of
//! them hold state across a call, so there is nothing a struct instance
//! would buy over a module of pure text transforms.

/// One lexed `;`-separated token within a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare name with no `=` or `:=`.
    Name(String),
    /// `name=value`, with surrounding quotes on `value` stripped.
    Parameter(String, String),
    /// `name:=value`, with surrounding quotes on `value` stripped.
    Directive(String, String),
}

/// Splits a header value into clauses, respecting double-quoted regions.
///
/// A comma toggles nothing; a double quote toggles an "inside quotes" flag,
/// and a comma only ends a clause while that flag is clear.
pub fn split_clauses(value: &str) -> Vec<String> {
    split_unquoted(value, ',')
}

/// Splits one clause into its `;`-delimited tokens, trimming whitespace.
///
/// Unlike clause splitting this does not track quotes: `;` never appears
/// inside a quoted OSGi attribute value, so a plain split suffices.
pub fn split_tokens(clause: &str) -> Vec<String> {
    clause.split(';').map(|t| t.trim().to_string()).collect()
}

/// Splits a directive's list value (`uses:=`, `mandatory:=`, `include:=`,
/// `exclude:=`) on commas, respecting quoted sub-regions the same way
/// clauses do.
pub fn split_list(value: &str) -> Vec<String> {
    split_unquoted(value, ',')
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn split_unquoted(value: &str, delim: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in value.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            c if c == delim && !in_quotes => {
                parts.push(current.trim().to_string());
                current = String::new();
            }
            c => current.push(c),
        }
    }
    parts.push(current.trim().to_string());
    parts
}

/// Trims characters matching `pred` from the start of `s`.
pub fn trim_left_if(s: &str, pred: impl Fn(char) -> bool) -> &str {
    s.trim_start_matches(pred)
}

/// Trims characters matching `pred` from the end of `s`.
pub fn trim_right_if(s: &str, pred: impl Fn(char) -> bool) -> &str {
    s.trim_end_matches(pred)
}

/// Case-insensitive `s[offset..].starts_with(prefix)`.
pub fn starts_with_ignore_case(s: &str, offset: usize, prefix: &str) -> bool {
    let slice = &s[offset.min(s.len())..];
    slice.len() >= prefix.len() && slice[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Case-insensitive `s.ends_with(suffix)`.
pub fn ends_with_ignore_case(s: &str, suffix: &str) -> bool {
    s.len() >= suffix.len() && s[s.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// Strips one layer of surrounding double quotes, if present on both ends.
fn unquote(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Lexes one `;`-separated token into a [`Token`].
///
/// `:=` is checked before `=` so that a directive's `name:=value` is never
/// mistaken for a parameter named `name:`.
pub fn lex_token(token: &str) -> Token {
    if let Some(idx) = token.find(":=") {
        let name = token[..idx].trim().to_string();
        let value = unquote(&token[idx + 2..]);
        return Token::Directive(name, value);
    }
    if let Some(idx) = token.find('=') {
        let name = token[..idx].trim().to_string();
        let value = unquote(&token[idx + 1..]);
        return Token::Parameter(name, value);
    }
    Token::Name(token.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_clauses_on_unquoted_commas() {
        let clauses = split_clauses(r#"a;x="1,2",b"#);
        assert_eq!(clauses, vec![r#"a;x="1,2""#, "b"]);
    }

    #[test]
    fn splits_tokens_on_semicolons() {
        assert_eq!(
            split_tokens("pkg;version=\"1.0\";resolution:=optional"),
            vec!["pkg", "version=\"1.0\"", "resolution:=optional"]
        );
    }

    #[test]
    fn splits_lists_respecting_quotes() {
        assert_eq!(split_list("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list(r#""a,b",c"#), vec![r#""a,b""#, "c"]);
    }

    #[test]
    fn trims_only_matching_characters_from_each_end() {
        assert_eq!(trim_left_if("  \tpkg", char::is_whitespace), "pkg");
        assert_eq!(trim_right_if("pkg  \t", char::is_whitespace), "pkg");
        assert_eq!(trim_left_if("pkg", char::is_whitespace), "pkg");
    }

    #[test]
    fn matches_prefix_and_suffix_ignoring_case() {
        assert!(starts_with_ignore_case("FRAMEWORK", 0, "framework"));
        assert!(starts_with_ignore_case("xFRAMEWORK", 1, "framework"));
        assert!(!starts_with_ignore_case("frame", 0, "framework"));
        assert!(ends_with_ignore_case("BootClassPath", "bootclasspath"));
        assert!(!ends_with_ignore_case("path", "bootclasspath"));
    }

    #[test]
    fn lexes_directives_parameters_and_names() {
        assert_eq!(
            lex_token("resolution:=optional"),
            Token::Directive("resolution".to_string(), "optional".to_string())
        );
        assert_eq!(
            lex_token("version=\"1.0\""),
            Token::Parameter("version".to_string(), "1.0".to_string())
        );
        assert_eq!(lex_token("com.example.foo"), Token::Name("com.example.foo".to_string()));
    }
}

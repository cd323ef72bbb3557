//! Identifier quoting
//!
//! Every identifier that reaches the rendered text goes through [`quote`].
//! Tokens that are already expressions (`*`, `/regex/`, `:PLACEHOLDER`,
//! `time(6h)`, `(select ...)`) are passed through untouched.

/// Whether a token is rendered verbatim instead of double quoted
pub fn is_bare(token: &str) -> bool {
    token == "*" || is_regex_literal(token) || token.starts_with(':') || token.contains('(')
}

/// Whether a token is an explicit regular expression literal such as `/temp.*/`
pub fn is_regex_literal(token: &str) -> bool {
    token.len() > 2 && token.starts_with('/') && token.ends_with('/')
}

/// Quote an identifier for use in a select statement
///
/// Double quotes are added verbatim, embedded double quotes are the caller's
/// problem.
pub fn quote(token: &str) -> String {
    if is_bare(token) {
        token.to_string()
    } else {
        format!("\"{}\"", token)
    }
}

/// Address a leaf through optional database and retention policy segments
///
/// An absent segment stays empty, so a missing database yields `."rp"."leaf"`
/// and a missing retention policy yields `"db".."leaf"`.
pub fn address(database: Option<&str>, retention_policy: Option<&str>, leaf: &str) -> String {
    match (database, retention_policy) {
        (None, None) => quote(leaf),
        (db, rp) => format!(
            "{}.{}.{}",
            db.map(quote).unwrap_or_default(),
            rp.map(quote).unwrap_or_default(),
            quote(leaf)
        ),
    }
}

/// Quote a database-level identifier only when InfluxQL requires it
///
/// Identifiers starting with a digit or containing anything other than
/// ASCII letters, digits and `_` are double quoted.
pub fn quote_if_needed(identifier: &str) -> String {
    let starts_with_digit = identifier
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_digit());
    let plain = identifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if starts_with_digit || !plain || identifier.is_empty() {
        format!("\"{}\"", identifier)
    } else {
        identifier.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain_identifiers() {
        assert_eq!(quote("http"), "\"http\"");
        assert_eq!(quote("fetch time"), "\"fetch time\"");
        assert_eq!(quote("my-rp"), "\"my-rp\"");
    }

    #[test]
    fn test_quote_passthrough_tokens() {
        assert_eq!(quote("*"), "*");
        assert_eq!(quote("/temperature/"), "/temperature/");
        assert_eq!(quote(":MEASUREMENT"), ":MEASUREMENT");
        assert_eq!(quote("time(6h)"), "time(6h)");
        assert_eq!(quote("bottom(\"use\",3)"), "bottom(\"use\",3)");
    }

    #[test]
    fn test_single_slash_is_not_regex() {
        assert!(!is_regex_literal("/"));
        assert!(!is_regex_literal("//"));
        assert_eq!(quote("/"), "\"/\"");
    }

    #[test]
    fn test_address() {
        assert_eq!(address(None, None, "http"), "\"http\"");
        assert_eq!(address(Some("mydb"), None, "http"), "\"mydb\"..\"http\"");
        assert_eq!(
            address(Some("mydb"), Some("default"), "http"),
            "\"mydb\".\"default\".\"http\""
        );
        assert_eq!(address(None, Some("autogen"), "http"), ".\"autogen\".\"http\"");
        assert_eq!(
            address(Some("where_else"), Some("autogen"), ":MEASUREMENT"),
            "\"where_else\".\"autogen\".:MEASUREMENT"
        );
    }

    #[test]
    fn test_quote_if_needed() {
        assert_eq!(quote_if_needed("mydb"), "mydb");
        assert_eq!(quote_if_needed("ABab"), "ABab");
        assert_eq!(quote_if_needed("my_db2"), "my_db2");
        assert_eq!(quote_if_needed("012"), "\"012\"");
        assert_eq!(quote_if_needed("A-B"), "\"A-B\"");
        assert_eq!(quote_if_needed("my db"), "\"my db\"");
    }
}

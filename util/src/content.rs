//! Small helpers for working with authored content strings.

/// Strip a marker prefix from a string, returning the string unchanged when
/// the prefix is absent.
pub fn remove_prefix<'a>(prefix: &str, s: &'a str) -> &'a str {
    s.strip_prefix(prefix).unwrap_or(s)
}

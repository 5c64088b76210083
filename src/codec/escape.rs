//! String escaping for quoted identifiers and array elements.

/// Quote an identifier, doubling embedded double quotes.
///
/// Each `.`-separated segment is quoted on its own so schema-qualified names
/// keep their structure.
///
/// # Examples
/// ```
/// use pg_codec::escape_identifier;
///
/// assert_eq!(escape_identifier("users"), r#""users""#);
/// assert_eq!(escape_identifier("public.users"), r#""public"."users""#);
/// assert_eq!(escape_identifier(r#"a.b"c"#), r#""a"."b""c""#);
/// ```
pub fn escape_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 2);
    result.push('"');
    for c in name.chars() {
        match c {
            '"' => result.push_str("\"\""),
            '.' => result.push_str("\".\""),
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

/// Escape text for use inside a double-quoted array element.
///
/// Only `\` and `"` need escaping; structural characters are safe once the
/// element is quoted.
pub fn escape_array_element(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            c => result.push(c),
        }
    }
    result
}

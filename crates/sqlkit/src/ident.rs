//! SQL identifier escaping.
//!
//! Table and column names are emitted bare when they consist only of
//! `[A-Za-z0-9_.]` (so dotted `schema.table` stays addressable), and wrapped in the
//! quoting character otherwise.
//!
//! # Example
//! ```ignore
//! use sqlkit::ident::escape_identifier;
//!
//! assert_eq!(escape_identifier("public.users", '`'), "public.users");
//! assert_eq!(escape_identifier("Order Items", '`'), "`Order Items`");
//! ```

/// Default quoting character (MySQL style).
pub const DEFAULT_QUOTE: char = '`';

/// Whether `name` can be emitted without quoting: non-empty and `[A-Za-z0-9_.]+`.
pub fn is_bare_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
}

/// Escape a table or column name.
///
/// Safe bare identifiers are returned unchanged; anything else is wrapped in
/// `quote`, with embedded quote characters doubled.
pub fn escape_identifier(name: &str, quote: char) -> String {
    if is_bare_identifier(name) {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(&mut out, name, quote);
    out
}

pub(crate) fn write_quoted(out: &mut String, name: &str, quote: char) {
    out.push(quote);
    for ch in name.chars() {
        if ch == quote {
            out.push(quote);
        }
        out.push(ch);
    }
    out.push(quote);
}

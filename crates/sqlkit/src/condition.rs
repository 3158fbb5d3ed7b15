//! Filter specs compiled into flat conjunctive WHERE predicates.
//!
//! A [`FilterSpec`] maps field names to filter values. Numbers compile to plain
//! equality; strings are parsed with the following precedence (first match wins):
//!
//! | value          | predicate                              |
//! |----------------|----------------------------------------|
//! | `>=V` `<=V` `<>V` `>V` `<V` | `field OP 'V'`            |
//! | `(a,b,c)`      | `field IN ('a','b','c')`               |
//! | `lo..hi`       | `(field BETWEEN 'lo' AND 'hi')`        |
//! | contains `*`/`?` | `field LIKE 'a%b_'`                  |
//! | anything else  | `field = 'V'`                          |
//!
//! Clauses are joined with ` AND `. There is no OR and no grouping.
//!
//! # Example
//! ```ignore
//! use sqlkit::FilterSpec;
//!
//! let spec = FilterSpec::new()
//!     .with("id", 5)
//!     .with("year", ">2010")
//!     .with("price", "100..200");
//! let predicate = db.where_clause(&spec);
//! // id = 5 AND year > '2010' AND (price BETWEEN '100' AND '200')
//! ```

use crate::ident::escape_identifier;
use serde_json::Number;

const COMPARISON_OPS: [&str; 5] = [">=", "<=", "<>", ">", "<"];

/// A single filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Numeric equality, emitted without quoting.
    Number(Number),
    /// Operator / range / set / wildcard expression.
    Text(String),
}

macro_rules! impl_filter_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterValue {
                fn from(v: $t) -> Self {
                    FilterValue::Number(Number::from(v))
                }
            }
        )*
    };
}

impl_filter_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        match Number::from_f64(v) {
            Some(n) => FilterValue::Number(n),
            // NaN and infinities have no SQL numeric literal.
            None => FilterValue::Text(v.to_string()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<&String> for FilterValue {
    fn from(v: &String) -> Self {
        FilterValue::Text(v.clone())
    }
}

/// Ordered mapping of field name to [`FilterValue`].
///
/// A field that is absent places no constraint. Setting a field twice replaces
/// the earlier value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSpec {
    entries: Vec<(String, FilterValue)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a field filter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FilterValue>) {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(f, v)| (f.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for FilterSpec {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut spec = FilterSpec::new();
        for (k, v) in iter {
            spec.insert(k, v);
        }
        spec
    }
}

/// Compile a filter spec into a predicate.
///
/// `escape` renders a string as a quoted literal; `quote` is the identifier quote
/// character. An empty spec compiles to an empty string, which callers must treat
/// as "no WHERE clause".
pub fn compile_where(spec: &FilterSpec, quote: char, escape: impl Fn(&str) -> String) -> String {
    let mut out = String::new();
    for (field, value) in spec.iter() {
        if !out.is_empty() {
            out.push_str(" AND ");
        }
        let column = escape_identifier(field, quote);
        out.push_str(&compile_clause(&column, value, &escape));
    }
    out
}

fn compile_clause(column: &str, value: &FilterValue, escape: &impl Fn(&str) -> String) -> String {
    let text = match value {
        FilterValue::Number(n) => return format!("{column} = {n}"),
        FilterValue::Text(text) => text.as_str(),
    };

    for op in COMPARISON_OPS {
        if let Some(rest) = text.strip_prefix(op) {
            return format!("{column} {op} {}", escape(rest));
        }
    }

    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let members = inner.split(',').map(escape).collect::<Vec<_>>().join(",");
        return format!("{column} IN ({members})");
    }

    if let Some((lo, hi)) = text.split_once("..") {
        return format!("({column} BETWEEN {} AND {})", escape(lo), escape(hi));
    }

    if text.contains(['*', '?']) {
        let pattern = text.replace('*', "%").replace('?', "_");
        return format!("{column} LIKE {}", escape(&pattern));
    }

    format!("{column} = {}", escape(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::ident::DEFAULT_QUOTE;

    fn esc(s: &str) -> String {
        Dialect::MySql.escape_str(s)
    }

    fn compile(spec: &FilterSpec) -> String {
        compile_where(spec, DEFAULT_QUOTE, esc)
    }

    #[test]
    fn number_is_plain_equality() {
        assert_eq!(compile(&FilterSpec::new().with("k", 5)), "k = 5");
        assert_eq!(compile(&FilterSpec::new().with("k", 2.5)), "k = 2.5");
    }

    #[test]
    fn empty_spec_is_empty_string() {
        assert_eq!(compile(&FilterSpec::new()), "");
    }

    #[test]
    fn comparison_operators() {
        for op in [">=", "<=", "<>", ">", "<"] {
            let spec = FilterSpec::new().with("k", format!("{op}V"));
            assert_eq!(compile(&spec), format!("k {op} {}", esc("V")));
        }
    }

    #[test]
    fn two_char_operators_win_over_one_char() {
        let spec = FilterSpec::new().with("level", "<=3");
        assert_eq!(compile(&spec), format!("level <= {}", esc("3")));
    }

    #[test]
    fn set_membership() {
        let spec = FilterSpec::new().with("k", "(1,2,3)");
        assert_eq!(
            compile(&spec),
            format!("k IN ({},{},{})", esc("1"), esc("2"), esc("3"))
        );
    }

    #[test]
    fn unclosed_paren_is_not_a_set() {
        let spec = FilterSpec::new().with("k", "(1,2");
        assert_eq!(compile(&spec), format!("k = {}", esc("(1,2")));
    }

    #[test]
    fn range_escapes_both_bounds() {
        let spec = FilterSpec::new().with("k", "1..5");
        assert_eq!(
            compile(&spec),
            format!("(k BETWEEN {} AND {})", esc("1"), esc("5"))
        );
    }

    #[test]
    fn range_bounds_cannot_inject() {
        let spec = FilterSpec::new().with("k", "1..5' OR '1'='1");
        let sql = compile(&spec);
        assert_eq!(
            sql,
            format!("(k BETWEEN {} AND {})", esc("1"), esc("5' OR '1'='1"))
        );
    }

    #[test]
    fn wildcards_become_like() {
        let spec = FilterSpec::new().with("k", "a*b?");
        assert_eq!(compile(&spec), format!("k LIKE {}", esc("a%b_")));
    }

    #[test]
    fn plain_string_equality() {
        let spec = FilterSpec::new().with("label", "str");
        assert_eq!(compile(&spec), "label = 'str'");
    }

    #[test]
    fn clauses_join_with_and_in_insertion_order() {
        let spec = FilterSpec::new()
            .with("id", 5)
            .with("year", ">2010")
            .with("price", "100..200")
            .with("level", "<=3")
            .with("sn", "*str?")
            .with("label", "str")
            .with("code", "(1,2,4,10,11)");
        assert_eq!(
            compile(&spec),
            "id = 5 AND year > '2010' AND (price BETWEEN '100' AND '200') \
             AND level <= '3' AND sn LIKE '%str_' AND label = 'str' \
             AND code IN ('1','2','4','10','11')"
        );
    }

    #[test]
    fn unsafe_field_names_are_quoted() {
        let spec = FilterSpec::new().with("first name", "Bob");
        assert_eq!(compile(&spec), "`first name` = 'Bob'");
    }

    #[test]
    fn replacing_a_field_keeps_position() {
        let spec = FilterSpec::new().with("a", 1).with("b", 2).with("a", 3);
        assert_eq!(compile(&spec), "a = 3 AND b = 2");
    }

    #[test]
    fn postgres_escaping() {
        let spec = FilterSpec::new().with("name", "O'Hara");
        let sql = compile_where(&spec, '"', |s| Dialect::Postgres.escape_str(s));
        assert_eq!(sql, "name = 'O''Hara'");
    }
}

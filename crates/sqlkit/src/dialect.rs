//! SQL dialect differences: identifier quoting, literal escaping and the few
//! clauses that are spelled differently between MySQL and PostgreSQL.

use crate::ident::DEFAULT_QUOTE;
use crate::statement::Limit;
use serde_json::Value;

/// SQL dialect spoken by an [`Executor`](crate::client::Executor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// MySQL / MariaDB
    #[default]
    MySql,
    /// PostgreSQL
    Postgres,
}

impl Dialect {
    /// Identifier quoting character.
    pub fn quote_char(self) -> char {
        match self {
            Dialect::MySql => DEFAULT_QUOTE,
            Dialect::Postgres => '"',
        }
    }

    /// Render `value` as an injection-safe SQL literal.
    pub fn escape_value(self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => match self {
                Dialect::MySql => b.to_string(),
                Dialect::Postgres => if *b { "TRUE" } else { "FALSE" }.to_string(),
            },
            Value::Number(n) => n.to_string(),
            Value::String(s) => self.escape_str(s),
            Value::Array(items) if self == Dialect::MySql => items
                .iter()
                .map(|item| self.escape_value(item))
                .collect::<Vec<_>>()
                .join(", "),
            other => self.escape_str(&other.to_string()),
        }
    }

    /// Render a string as a quoted SQL literal.
    pub fn escape_str(self, s: &str) -> String {
        match self {
            Dialect::MySql => escape_mysql_str(s),
            Dialect::Postgres => postgres_protocol::escape::escape_literal(s),
        }
    }

    /// Render a ` LIMIT ...` suffix (with leading space).
    pub fn limit_clause(self, limit: &Limit) -> String {
        match (self, limit.offset) {
            (_, None) => format!(" LIMIT {}", limit.count),
            (Dialect::MySql, Some(offset)) => format!(" LIMIT {},{}", offset, limit.count),
            (Dialect::Postgres, Some(offset)) => {
                format!(" LIMIT {} OFFSET {}", limit.count, offset)
            }
        }
    }

    /// INSERT body used when no row column matches the schema.
    pub fn empty_insert_body(self) -> &'static str {
        match self {
            Dialect::MySql => " () VALUES ()",
            Dialect::Postgres => " DEFAULT VALUES",
        }
    }

    /// Whether the generated id has to be requested with `RETURNING`.
    pub fn returns_insert_id(self) -> bool {
        matches!(self, Dialect::Postgres)
    }
}

fn escape_mysql_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mysql_escapes_quotes_and_backslashes() {
        let d = Dialect::MySql;
        assert_eq!(d.escape_value(&json!("it's")), r"'it\'s'");
        assert_eq!(d.escape_value(&json!(r"a\b")), r"'a\\b'");
        assert_eq!(d.escape_value(&json!("line\nbreak")), r"'line\nbreak'");
    }

    #[test]
    fn postgres_doubles_quotes() {
        let d = Dialect::Postgres;
        assert_eq!(d.escape_value(&json!("it's")), "'it''s'");
        assert!(d.escape_value(&json!(r"a\b")).ends_with(r"E'a\\b'"));
    }

    #[test]
    fn scalars_render_unquoted() {
        assert_eq!(Dialect::MySql.escape_value(&json!(null)), "NULL");
        assert_eq!(Dialect::MySql.escape_value(&json!(42)), "42");
        assert_eq!(Dialect::MySql.escape_value(&json!(true)), "true");
        assert_eq!(Dialect::Postgres.escape_value(&json!(false)), "FALSE");
        assert_eq!(Dialect::Postgres.escape_value(&json!(1.5)), "1.5");
    }

    #[test]
    fn arrays_and_objects() {
        assert_eq!(Dialect::MySql.escape_value(&json!([1, "a"])), "1, 'a'");
        assert_eq!(
            Dialect::Postgres.escape_value(&json!({"k": 1})),
            r#"'{"k":1}'"#
        );
    }

    #[test]
    fn limit_rendering() {
        let page = Limit {
            offset: Some(20),
            count: 10,
        };
        assert_eq!(Dialect::MySql.limit_clause(&page), " LIMIT 20,10");
        assert_eq!(Dialect::Postgres.limit_clause(&page), " LIMIT 10 OFFSET 20");
        assert_eq!(Dialect::MySql.limit_clause(&Limit::from(5)), " LIMIT 5");
    }
}

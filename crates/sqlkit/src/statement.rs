//! Generated statements and client-side parameter formatting.

use serde_json::Value;

/// SQL text produced by the generator, with every value inlined, and the table
/// it targets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlStatement {
    pub sql: String,
    pub table: Option<String>,
}

impl SqlStatement {
    /// A statement with inlined values.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            table: None,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

/// Result of an executed operation plus the statement that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed<T> {
    pub value: T,
    pub statement: SqlStatement,
}

impl<T> Executed<T> {
    pub fn new(value: T, statement: SqlStatement) -> Self {
        Self { value, statement }
    }

    /// Drop the statement and keep the value.
    pub fn into_value(self) -> T {
        self.value
    }
}

/// `LIMIT` clause input: a row count with an optional leading offset.
///
/// Built from a single number (`count`) or a pair (`offset, count`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub offset: Option<u64>,
    pub count: u64,
}

impl From<u64> for Limit {
    fn from(count: u64) -> Self {
        Self {
            offset: None,
            count,
        }
    }
}

impl From<(u64, u64)> for Limit {
    fn from((offset, count): (u64, u64)) -> Self {
        Self {
            offset: Some(offset),
            count,
        }
    }
}

impl From<[u64; 1]> for Limit {
    fn from([count]: [u64; 1]) -> Self {
        count.into()
    }
}

impl From<[u64; 2]> for Limit {
    fn from([offset, count]: [u64; 2]) -> Self {
        (offset, count).into()
    }
}

/// Substitute `?` placeholders in `sql` with escaped literals, in order.
///
/// Placeholders beyond the supplied values are left untouched; surplus values are ignored.
/// With no values the SQL is returned unchanged.
pub fn format_params(sql: &str, params: &[Value], escape: impl Fn(&Value) -> String) -> String {
    if params.is_empty() {
        return sql.to_string();
    }
    let mut out = String::with_capacity(sql.len() + params.len() * 8);
    let mut values = params.iter();
    for ch in sql.chars() {
        if ch == '?' {
            if let Some(value) = values.next() {
                out.push_str(&escape(value));
                continue;
            }
        }
        out.push(ch);
    }
    out
}

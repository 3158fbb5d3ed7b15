use crate::client::QueryOutput;
use crate::error::OrmError;
use std::fmt;
use std::time::Duration;

/// The kind of SQL statement being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// SELECT query
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// SHOW statement (catalog introspection)
    Show,
    /// Anything else (DDL, SET, ...)
    Other,
}

impl QueryType {
    /// Classify a statement by its leading keyword, skipping comments and parentheses.
    pub fn from_sql(sql: &str) -> Self {
        fn strip_sql_prefix(sql: &str) -> &str {
            let mut s = sql;
            loop {
                let before = s;
                s = s.trim_start();
                if s.starts_with("--") {
                    match s.find('\n') {
                        Some(pos) => {
                            s = &s[pos + 1..];
                            continue;
                        }
                        None => return "",
                    }
                }
                if s.starts_with("/*") {
                    match s.find("*/") {
                        Some(pos) => {
                            s = &s[pos + 2..];
                            continue;
                        }
                        None => return "",
                    }
                }
                if let Some(rest) = s.strip_prefix('(') {
                    s = rest;
                    continue;
                }
                if s == before {
                    break;
                }
            }
            s
        }

        fn starts_with_keyword(s: &str, keyword: &str) -> bool {
            s.get(0..keyword.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(keyword))
        }

        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "SELECT") || starts_with_keyword(trimmed, "WITH") {
            QueryType::Select
        } else if starts_with_keyword(trimmed, "INSERT") {
            QueryType::Insert
        } else if starts_with_keyword(trimmed, "UPDATE") {
            QueryType::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            QueryType::Delete
        } else if starts_with_keyword(trimmed, "SHOW") {
            QueryType::Show
        } else {
            QueryType::Other
        }
    }
}

/// Context information about the statement being executed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// The SQL text sent to the backend.
    pub sql: String,
    /// Detected statement type.
    pub query_type: QueryType,
    /// Operation that issued the statement (e.g. `"insert"`, `"fields"`).
    pub tag: Option<String>,
}

impl QueryContext {
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            query_type: QueryType::from_sql(sql),
            tag: None,
        }
    }

    /// Add a tag to identify the issuing operation.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Result of a statement execution for monitoring purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Statement returned rows.
    Rows(usize),
    /// Statement affected rows (for mutations).
    Affected(u64),
    /// Statement failed with an error.
    Error(String),
}

impl QueryResult {
    pub(crate) fn from_output(result: &Result<QueryOutput, OrmError>) -> Self {
        match result {
            Ok(out) => match out.affected_rows {
                Some(n) if out.rows.is_empty() => QueryResult::Affected(n),
                _ => QueryResult::Rows(out.rows.len()),
            },
            Err(e) => QueryResult::Error(e.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryResult::Error(_))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(n) => write!(f, "{n} rows"),
            QueryResult::Affected(n) => write!(f, "{n} affected"),
            QueryResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Trait for observing statement execution and generator failures.
///
/// All callbacks run synchronously on the executing task, so keep them cheap.
pub trait QueryMonitor: Send + Sync {
    /// Called before a statement is executed.
    ///
    /// No-op by default.
    fn on_query_start(&self, _ctx: &QueryContext) {}

    /// Called after every statement completes (success or failure): the "query" event.
    ///
    /// `duration` covers the backend round trip only; `result` carries the row or
    /// affected count, or the backend error message.
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult);

    /// Called when a statement reaches the slow threshold: the "slow" event.
    ///
    /// No-op by default.
    fn on_slow_query(&self, _ctx: &QueryContext, _duration: Duration, _result: &QueryResult) {}

    /// Called when an operation aborts before issuing its write: the "error" event.
    ///
    /// Receives `TableNotFound`, `MissingKeySpec` and `EmptyPredicate`; backend errors
    /// reach monitors through `on_query_complete` instead.
    fn on_error(&self, _error: &OrmError) {}
}

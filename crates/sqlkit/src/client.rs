//! The execution backend consumed by the generator.
//!
//! sqlkit never opens or pools connections itself; anything that can run a SQL
//! string and report rows plus row counts can drive it by implementing
//! [`Executor`]. Implementations are provided for `tokio_postgres::Client`,
//! `tokio_postgres::Transaction` and (feature `pool`) `deadpool_postgres::Object`.

use crate::dialect::Dialect;
use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use serde_json::Value;
use tokio_postgres::SimpleQueryMessage;

/// Outcome of one executed statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    /// Returned rows, each in SELECT-list order.
    pub rows: Vec<Row>,
    /// Rows matched/affected by a DML statement.
    pub affected_rows: Option<u64>,
    /// Rows whose values actually changed (MySQL distinguishes this from affected).
    pub changed_rows: Option<u64>,
    /// Auto-increment id generated by an INSERT.
    pub insert_id: Option<u64>,
}

impl QueryOutput {
    pub fn rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn affected(n: u64) -> Self {
        Self {
            affected_rows: Some(n),
            ..Self::default()
        }
    }
}

/// A connection-like object that executes one SQL statement at a time.
///
/// Values reaching `execute` are already inlined and escaped via
/// [`Executor::escape_value`].
pub trait Executor: Send + Sync {
    /// Execute a statement and return its rows and counters.
    fn execute(&self, sql: &str) -> impl std::future::Future<Output = OrmResult<QueryOutput>> + Send;

    /// Execute a statement, associating a tag for monitoring/observability.
    ///
    /// The default implementation ignores `tag` and calls [`Executor::execute`].
    fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
    ) -> impl std::future::Future<Output = OrmResult<QueryOutput>> + Send {
        let _ = tag;
        self.execute(sql)
    }

    /// SQL dialect of the backend.
    fn dialect(&self) -> Dialect;

    /// Render a value as an injection-safe literal.
    ///
    /// The default implementation uses the dialect's escaping rules.
    fn escape_value(&self, value: &Value) -> String {
        self.dialect().escape_value(value)
    }
}

impl<E: Executor> Executor for &E {
    fn execute(&self, sql: &str) -> impl std::future::Future<Output = OrmResult<QueryOutput>> + Send {
        (**self).execute(sql)
    }

    fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
    ) -> impl std::future::Future<Output = OrmResult<QueryOutput>> + Send {
        (**self).execute_tagged(tag, sql)
    }

    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn escape_value(&self, value: &Value) -> String {
        (**self).escape_value(value)
    }
}

/// Fold simple-query protocol messages into a [`QueryOutput`].
///
/// Every column arrives as text (or NULL); the row keeps the server's column order.
pub(crate) fn collect_simple(messages: Vec<SimpleQueryMessage>) -> OrmResult<QueryOutput> {
    let mut output = QueryOutput::default();
    for message in messages {
        match message {
            SimpleQueryMessage::Row(row) => {
                let mut out = Row::new();
                for (idx, column) in row.columns().iter().enumerate() {
                    let text = row
                        .try_get(idx)
                        .map_err(|e| OrmError::decode(column.name(), e.to_string()))?;
                    out.set(
                        column.name(),
                        text.map_or(Value::Null, |s| Value::String(s.to_string())),
                    );
                }
                output.rows.push(out);
            }
            SimpleQueryMessage::CommandComplete(n) => {
                output.affected_rows = Some(n);
                output.changed_rows = Some(n);
            }
            _ => {}
        }
    }
    Ok(output)
}

impl Executor for tokio_postgres::Client {
    async fn execute(&self, sql: &str) -> OrmResult<QueryOutput> {
        let messages = self
            .simple_query(sql)
            .await
            .map_err(OrmError::from_db_error)?;
        collect_simple(messages)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }
}

impl Executor for tokio_postgres::Transaction<'_> {
    async fn execute(&self, sql: &str) -> OrmResult<QueryOutput> {
        let messages = self
            .simple_query(sql)
            .await
            .map_err(OrmError::from_db_error)?;
        collect_simple(messages)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }
}

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::Object {
    async fn execute(&self, sql: &str) -> OrmResult<QueryOutput> {
        let client: &tokio_postgres::Client = self;
        Executor::execute(client, sql).await
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }
}

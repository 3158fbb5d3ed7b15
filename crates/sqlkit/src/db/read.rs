//! SELECT and count assembly. No schema fetch is involved.

use super::Db;
use crate::client::Executor;
use crate::condition::FilterSpec;
use crate::error::{OrmError, OrmResult};
use crate::order::OrderSpec;
use crate::row::{Row, value_as_u64};
use crate::shape::scalar_shape;
use crate::statement::{Executed, Limit, SqlStatement};

impl<C: Executor> Db<C> {
    /// Select `fields` (`"*"` or column names) from `table`.
    ///
    /// Each entry of `fields` is escaped as one identifier, so expressions such as
    /// `count(*)` or a comma-joined list like `"id, name"` end up quoted; use
    /// [`Db::query`] for those. An empty slice selects `*`. Empty filter and order
    /// specs add no `WHERE` / `ORDER BY` clause.
    pub async fn select(
        &self,
        table: &str,
        fields: &[&str],
        filter: &FilterSpec,
        order: &OrderSpec,
    ) -> OrmResult<Executed<Vec<Row>>> {
        let statement = self.select_statement(table, fields, filter, order, None);
        let output = self.run("select", &statement.sql).await?;
        Ok(Executed::new(output.rows, statement))
    }

    /// [`Db::select`] with a `LIMIT`: a count, or an `(offset, count)` pair.
    pub async fn select_limit(
        &self,
        table: &str,
        fields: &[&str],
        limit: impl Into<Limit>,
        filter: &FilterSpec,
        order: &OrderSpec,
    ) -> OrmResult<Executed<Vec<Row>>> {
        let limit = limit.into();
        let statement = self.select_statement(table, fields, filter, order, Some(&limit));
        let output = self.run("select_limit", &statement.sql).await?;
        Ok(Executed::new(output.rows, statement))
    }

    /// Number of rows in `table` matching `filter`.
    pub async fn count(&self, table: &str, filter: &FilterSpec) -> OrmResult<u64> {
        let mut sql = format!("SELECT count(*) FROM {}", self.escape_identifier(table));
        let predicate = self.where_clause(filter);
        if !predicate.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }

        let output = self.run("count", &sql).await?;
        scalar_shape(output.rows)
            .as_ref()
            .and_then(value_as_u64)
            .ok_or_else(|| OrmError::decode("count(*)", "expected a numeric count"))
    }

    pub(crate) fn select_statement(
        &self,
        table: &str,
        fields: &[&str],
        filter: &FilterSpec,
        order: &OrderSpec,
        limit: Option<&Limit>,
    ) -> SqlStatement {
        let list = if fields.is_empty() {
            "*".to_string()
        } else {
            fields
                .iter()
                .map(|f| if *f == "*" { f.to_string() } else { self.escape_identifier(f) })
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", list, self.escape_identifier(table));
        let predicate = self.where_clause(filter);
        if !predicate.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }
        let order = self.order_clause(order);
        if !order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }
        if let Some(limit) = limit {
            sql.push_str(&self.dialect().limit_clause(limit));
        }
        SqlStatement::new(sql).with_table(table)
    }
}

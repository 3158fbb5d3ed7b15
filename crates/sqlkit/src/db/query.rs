//! Raw SQL with `?` placeholders, reduced by the result shapers.

use super::Db;
use crate::client::{Executor, QueryOutput};
use crate::error::OrmResult;
use crate::row::Row;
use crate::shape::{column_shape, hash_shape, key_value_shape, row_shape, scalar_shape};
use crate::statement::format_params;
use serde_json::Value;
use std::collections::BTreeMap;

impl<C: Executor> Db<C> {
    /// Execute `sql`, substituting each `?` with the next escaped value of `params`.
    pub async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<QueryOutput> {
        let sql = format_params(sql, params, |v| self.escape_value(v));
        self.run("query", &sql).await
    }

    /// All rows.
    pub async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        Ok(self.execute(sql, params).await?.rows)
    }

    /// First row.
    pub async fn query_row(&self, sql: &str, params: &[Value]) -> OrmResult<Option<Row>> {
        Ok(row_shape(self.query(sql, params).await?))
    }

    /// First column of the first row.
    pub async fn query_value(&self, sql: &str, params: &[Value]) -> OrmResult<Option<Value>> {
        Ok(scalar_shape(self.query(sql, params).await?))
    }

    /// First column of every row.
    pub async fn query_col(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Value>> {
        Ok(column_shape(self.query(sql, params).await?))
    }

    /// Rows keyed by their first column.
    pub async fn query_hash(&self, sql: &str, params: &[Value]) -> OrmResult<BTreeMap<String, Row>> {
        Ok(hash_shape(self.query(sql, params).await?))
    }

    /// First column mapped to second column.
    pub async fn query_key_value(
        &self,
        sql: &str,
        params: &[Value],
    ) -> OrmResult<BTreeMap<String, Value>> {
        Ok(key_value_shape(self.query(sql, params).await?))
    }
}

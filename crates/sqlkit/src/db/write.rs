//! Schema-driven INSERT / UPDATE / UPSERT / DELETE.
//!
//! Writes that need column metadata fetch it fresh with [`Db::fields`] first. An
//! operation either issues its final write or aborts before any write is sent;
//! aborts are reported both as `Err` and on the monitor's error channel.

use super::Db;
use crate::client::Executor;
use crate::condition::FilterSpec;
use crate::error::{OrmError, OrmResult};
use crate::introspect::{ColumnMetadata, Columns};
use crate::row::{Row, value_as_u64};
use crate::shape::scalar_shape;
use crate::statement::{Executed, SqlStatement};
use serde_json::Value;

/// Which path an [`upsert`](Db::upsert) took, with that path's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    /// No row matched the key; carries the generated id, if any.
    Inserted(Option<u64>),
    /// Exactly one row matched; carries the changed-row count, if reported.
    Updated(Option<u64>),
}

impl<C: Executor> Db<C> {
    /// Insert the columns of `row` that exist in `table`, in schema order.
    ///
    /// Fields unknown to the schema are dropped. Returns the generated id when the
    /// backend reports one.
    pub async fn insert(&self, table: &str, row: &Row) -> OrmResult<Executed<Option<u64>>> {
        let columns = self.columns_for_write(table).await?;
        let statement = self.insert_statement(table, &columns, row);
        let output = self.run("insert", &statement.sql).await?;

        let id = output.insert_id.or_else(|| {
            output
                .rows
                .first()
                .and_then(Row::first)
                .and_then(value_as_u64)
        });
        Ok(Executed::new(id, statement))
    }

    /// Update every field of `row` on the rows matching `filter`.
    ///
    /// An empty filter aborts with [`OrmError::EmptyPredicate`] without touching the
    /// database. Returns the changed-row count when the backend reports one.
    pub async fn update_where(
        &self,
        table: &str,
        row: &Row,
        filter: &FilterSpec,
    ) -> OrmResult<Executed<Option<u64>>> {
        let predicate = self.where_clause(filter);
        if predicate.is_empty() {
            return self.fail(OrmError::empty_predicate(table, "update"));
        }
        if row.is_empty() {
            return Err(empty_set(table));
        }

        let assignments = row
            .iter()
            .map(|(name, value)| self.assignment(name, value))
            .collect::<Vec<_>>();
        self.execute_update(table, &assignments, &predicate).await
    }

    /// Update a row matched on its key.
    ///
    /// The first schema-ordered PRIMARY or UNIQUE column present in `row` becomes
    /// the predicate; every other schema column in `row` is assigned. Aborts with
    /// [`OrmError::MissingKeySpec`] when `row` carries no such column.
    pub async fn update_by_key(&self, table: &str, row: &Row) -> OrmResult<Executed<Option<u64>>> {
        let columns = self.columns_for_write(table).await?;
        let Some(key) = columns.key_in(row) else {
            return self.fail(OrmError::missing_key_spec(table));
        };

        let assignments = columns
            .present_in(row)
            .filter(|c| c.name != key.name)
            .filter_map(|c| row.get(&c.name).map(|v| self.assignment(&c.name, v)))
            .collect::<Vec<_>>();
        if assignments.is_empty() {
            return Err(empty_set(table));
        }

        let predicate = self.key_predicate(key, row);
        self.execute_update(table, &assignments, &predicate).await
    }

    /// Insert `row`, or update it when a row with the same key already exists.
    ///
    /// Counts existing rows with `SELECT count(*)` on the first schema-ordered key
    /// column present in `row`: a count of exactly 1 updates via
    /// [`Db::update_by_key`], anything else inserts. The check takes no lock, so two callers racing on the same new
    /// key can both insert; the loser gets [`OrmError::UniqueViolation`] or a driver error.
    ///
    /// A row holding nothing but its key that matches an existing row has nothing
    /// to write: the result is `Updated(Some(0))` and the count query is the
    /// returned statement.
    pub async fn upsert(&self, table: &str, row: &Row) -> OrmResult<Executed<Upserted>> {
        let columns = self.columns_for_write(table).await?;
        let Some(key) = columns.key_in(row) else {
            return self.fail(OrmError::missing_key_spec(table));
        };
        let key_only = columns.present_in(row).all(|c| c.name == key.name);

        let existing = SqlStatement::new(format!(
            "SELECT count(*) FROM {} WHERE {}",
            self.escape_identifier(table),
            self.key_predicate(key, row)
        ))
        .with_table(table);
        let output = self.run("upsert", &existing.sql).await?;
        let count = scalar_shape(output.rows)
            .as_ref()
            .and_then(value_as_u64)
            .ok_or_else(|| OrmError::decode("count(*)", "existence check returned no count"))?;

        if count == 1 && key_only {
            Ok(Executed::new(Upserted::Updated(Some(0)), existing))
        } else if count == 1 {
            let updated = self.update_by_key(table, row).await?;
            Ok(Executed::new(Upserted::Updated(updated.value), updated.statement))
        } else {
            let inserted = self.insert(table, row).await?;
            Ok(Executed::new(Upserted::Inserted(inserted.value), inserted.statement))
        }
    }

    /// Delete the rows matching `filter`.
    ///
    /// An empty filter aborts with [`OrmError::EmptyPredicate`] and nothing is sent,
    /// so a missing filter can never wipe a table. Returns the affected-row count.
    pub async fn delete(&self, table: &str, filter: &FilterSpec) -> OrmResult<Executed<Option<u64>>> {
        let predicate = self.where_clause(filter);
        if predicate.is_empty() {
            return self.fail(OrmError::empty_predicate(table, "delete from"));
        }

        let statement = SqlStatement::new(format!(
            "DELETE FROM {} WHERE {}",
            self.escape_identifier(table),
            predicate
        ))
        .with_table(table);
        let output = self.run("delete", &statement.sql).await?;
        Ok(Executed::new(output.affected_rows, statement))
    }

    async fn columns_for_write(&self, table: &str) -> OrmResult<Columns> {
        match self.fields(table).await {
            Ok(columns) if !columns.is_empty() => Ok(columns),
            _ => self.fail(OrmError::table_not_found(table)),
        }
    }

    fn insert_statement(&self, table: &str, columns: &Columns, row: &Row) -> SqlStatement {
        let mut names = Vec::new();
        let mut values = Vec::new();
        for column in columns.present_in(row) {
            if let Some(value) = row.get(&column.name) {
                names.push(self.escape_identifier(&column.name));
                values.push(self.escape_value(value));
            }
        }

        let mut sql = format!("INSERT INTO {}", self.escape_identifier(table));
        if names.is_empty() {
            sql.push_str(self.dialect().empty_insert_body());
        } else {
            sql.push_str(&format!(
                " ({}) VALUES ({})",
                names.join(", "),
                values.join(", ")
            ));
        }
        if self.dialect().returns_insert_id()
            && let Some(id) = columns.auto_increment()
        {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.escape_identifier(&id.name));
        }
        SqlStatement::new(sql).with_table(table)
    }

    async fn execute_update(
        &self,
        table: &str,
        assignments: &[String],
        predicate: &str,
    ) -> OrmResult<Executed<Option<u64>>> {
        let statement = SqlStatement::new(format!(
            "UPDATE {} SET {} WHERE {}",
            self.escape_identifier(table),
            assignments.join(", "),
            predicate
        ))
        .with_table(table);
        let output = self.run("update", &statement.sql).await?;
        Ok(Executed::new(output.changed_rows, statement))
    }

    fn assignment(&self, name: &str, value: &Value) -> String {
        format!("{} = {}", self.escape_identifier(name), self.escape_value(value))
    }

    /// `key = value` for a key column; callers guarantee `row` carries the key.
    fn key_predicate(&self, key: &ColumnMetadata, row: &Row) -> String {
        self.assignment(&key.name, row.get(&key.name).unwrap_or(&Value::Null))
    }
}

fn empty_set(table: &str) -> OrmError {
    OrmError::validation(format!("UPDATE of \"{table}\": SET clause cannot be empty"))
}

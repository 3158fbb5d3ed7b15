//! Schema introspection.
//!
//! Every call issues one read-only catalog statement and shapes the rows it gets
//! back. Nothing is cached: write operations fetch [`Db::fields`] again each time,
//! so they always see the live schema.

mod queries;

pub(crate) use queries::Catalog;

use crate::client::Executor;
use crate::db::Db;
use crate::error::{OrmError, OrmResult};
use crate::row::{Row, value_key, value_text};
use crate::shape::{column_shape, hash_shape, hash_shape_by, key_value_shape, row_shape};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Role a column plays in the table's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyRole {
    Primary,
    Unique,
    None,
}

impl KeyRole {
    /// Parse the `Key` column of `SHOW COLUMNS` (`PRI`, `UNI`, `MUL` or empty).
    pub fn from_key_flag(flag: &str) -> Self {
        match flag {
            "PRI" => KeyRole::Primary,
            "UNI" => KeyRole::Unique,
            _ => KeyRole::None,
        }
    }

    /// Whether a row can be matched on this column alone.
    pub fn identifies_row(self) -> bool {
        matches!(self, KeyRole::Primary | KeyRole::Unique)
    }
}

/// One column of a table, as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub column_type: String,
    pub nullable: bool,
    pub key_role: KeyRole,
    pub default: Option<String>,
    pub extra: String,
}

impl ColumnMetadata {
    /// Read a `SHOW FULL COLUMNS`-shaped row (`Field`, `Type`, `Null`, `Key`, `Default`, `Extra`).
    pub fn from_row(row: &Row) -> OrmResult<Self> {
        let name = row
            .get_str("Field")
            .ok_or_else(|| OrmError::decode("Field", "missing column name"))?;
        let text = |column: &str| row.get(column).and_then(value_text);

        Ok(Self {
            name,
            column_type: text("Type").unwrap_or_default(),
            nullable: text("Null").is_some_and(|n| n.eq_ignore_ascii_case("YES")),
            key_role: KeyRole::from_key_flag(text("Key").as_deref().unwrap_or("")),
            default: text("Default"),
            extra: text("Extra").unwrap_or_default(),
        })
    }

    pub fn is_auto_increment(&self) -> bool {
        self.extra.contains("auto_increment")
    }
}

/// Column metadata of one table, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Columns {
    columns: Vec<ColumnMetadata>,
}

impl Columns {
    pub fn new(columns: Vec<ColumnMetadata>) -> Self {
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Schema-ordered columns that are also present in `row`.
    pub fn present_in<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = &'a ColumnMetadata> {
        self.columns.iter().filter(|c| row.contains(&c.name))
    }

    /// First schema-ordered PRIMARY/UNIQUE column whose value `row` carries.
    pub fn key_in<'a>(&'a self, row: &'a Row) -> Option<&'a ColumnMetadata> {
        self.present_in(row).find(|c| c.key_role.identifies_row())
    }

    /// The column filled in by the server on insert, if any.
    pub fn auto_increment(&self) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.is_auto_increment())
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a ColumnMetadata;
    type IntoIter = std::slice::Iter<'a, ColumnMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

impl Serialize for Columns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in &self.columns {
            map.serialize_entry(&column.name, column)?;
        }
        map.end()
    }
}

impl<C: Executor> Db<C> {
    async fn catalog_rows(&self, tag: &str, sql: &str) -> OrmResult<Vec<Row>> {
        Ok(self.run(tag, sql).await?.rows)
    }

    /// Column metadata of `table`, in schema order.
    pub async fn fields(&self, table: &str) -> OrmResult<Columns> {
        let sql = self.catalog().fields(table);
        let rows = self.catalog_rows("fields", &sql).await?;
        let columns = rows
            .iter()
            .map(ColumnMetadata::from_row)
            .collect::<OrmResult<Vec<_>>>()?;
        Ok(Columns::new(columns))
    }

    /// Primary key row of `table`, if it has one.
    pub async fn primary(&self, table: &str) -> OrmResult<Option<Row>> {
        let sql = self.catalog().primary(table);
        Ok(row_shape(self.catalog_rows("primary", &sql).await?))
    }

    /// Foreign key columns of `table`, keyed by constraint name.
    pub async fn foreign(&self, table: &str) -> OrmResult<BTreeMap<String, Row>> {
        let sql = self.catalog().foreign(table);
        Ok(hash_shape(self.catalog_rows("foreign", &sql).await?))
    }

    /// Referential constraints of `table`, keyed by constraint name.
    pub async fn constraints(&self, table: &str) -> OrmResult<BTreeMap<String, Row>> {
        let sql = self.catalog().constraints(table);
        Ok(hash_shape(self.catalog_rows("constraints", &sql).await?))
    }

    /// Tables of the current database, keyed by table name.
    pub async fn tables(&self) -> OrmResult<BTreeMap<String, Row>> {
        let sql = self.catalog().tables();
        Ok(hash_shape(self.catalog_rows("tables", &sql).await?))
    }

    /// Tables of `database`, keyed by table name.
    pub async fn database_tables(&self, database: &str) -> OrmResult<BTreeMap<String, Row>> {
        let sql = self.catalog().database_tables(database);
        Ok(hash_shape(self.catalog_rows("database_tables", &sql).await?))
    }

    /// Status row of `table` (engine, row count, sizes, comment).
    pub async fn table_info(&self, table: &str) -> OrmResult<Option<Row>> {
        let sql = self.catalog().table_info(table);
        Ok(row_shape(self.catalog_rows("table_info", &sql).await?))
    }

    /// Indexes of `table`, keyed by index name (`Key_name`).
    pub async fn indexes(&self, table: &str) -> OrmResult<BTreeMap<String, Row>> {
        let sql = self.catalog().indexes(table);
        Ok(hash_shape_by(
            self.catalog_rows("indexes", &sql).await?,
            "Key_name",
        ))
    }

    /// Names of all databases visible to the connection.
    pub async fn databases(&self) -> OrmResult<Vec<String>> {
        let rows = self
            .catalog_rows("databases", self.catalog().databases())
            .await?;
        Ok(column_shape(rows)
            .iter()
            .filter(|v| !v.is_null())
            .map(value_key)
            .collect())
    }

    /// Server process list.
    pub async fn processes(&self) -> OrmResult<Vec<Row>> {
        self.catalog_rows("processes", self.catalog().processes())
            .await
    }

    /// Server variables as name → value.
    pub async fn global_variables(&self) -> OrmResult<BTreeMap<String, Value>> {
        let rows = self
            .catalog_rows("global_variables", self.catalog().global_variables())
            .await?;
        Ok(key_value_shape(rows))
    }

    /// Server status counters as name → value.
    pub async fn global_status(&self) -> OrmResult<BTreeMap<String, Value>> {
        let rows = self
            .catalog_rows("global_status", self.catalog().global_status())
            .await?;
        Ok(key_value_shape(rows))
    }

    /// Database accounts.
    pub async fn users(&self) -> OrmResult<Vec<Row>> {
        self.catalog_rows("users", self.catalog().users()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column(field: &str, key: &str) -> Row {
        Row::new()
            .with("Field", field)
            .with("Type", "int(11)")
            .with("Null", "NO")
            .with("Key", key)
            .with("Default", Value::Null)
            .with("Extra", "")
    }

    #[test]
    fn column_metadata_from_show_columns_row() {
        let row = column("id", "PRI").with("Extra", "auto_increment");
        let meta = ColumnMetadata::from_row(&row).unwrap();
        assert_eq!(meta.name, "id");
        assert_eq!(meta.key_role, KeyRole::Primary);
        assert!(!meta.nullable);
        assert_eq!(meta.default, None);
        assert!(meta.is_auto_increment());
    }

    #[test]
    fn column_metadata_requires_field() {
        let err = ColumnMetadata::from_row(&Row::new().with("Type", "int")).unwrap_err();
        assert!(matches!(err, OrmError::Decode { .. }));
    }

    #[test]
    fn mul_keys_do_not_identify_rows() {
        assert_eq!(KeyRole::from_key_flag("MUL"), KeyRole::None);
        assert!(!KeyRole::None.identifies_row());
        assert!(KeyRole::Unique.identifies_row());
    }

    #[test]
    fn key_in_uses_schema_order() {
        let columns = Columns::new(vec![
            ColumnMetadata::from_row(&column("name", "")).unwrap(),
            ColumnMetadata::from_row(&column("code", "UNI")).unwrap(),
            ColumnMetadata::from_row(&column("id", "PRI")).unwrap(),
        ]);
        let row = Row::new().with("id", 1).with("code", "UY").with("name", "x");
        assert_eq!(columns.key_in(&row).unwrap().name, "code");

        let row = Row::new().with("name", "x");
        assert!(columns.key_in(&row).is_none());
    }

    #[test]
    fn columns_serialize_as_ordered_map() {
        let columns = Columns::new(vec![
            ColumnMetadata::from_row(&column("b", "PRI")).unwrap(),
            ColumnMetadata::from_row(&column("a", "")).unwrap(),
        ]);
        let value = serde_json::to_value(&columns).unwrap();
        assert_eq!(value["b"]["key_role"], json!("PRIMARY"));
        assert_eq!(value["a"]["key_role"], json!("NONE"));
        let text = serde_json::to_string(&columns).unwrap();
        assert!(text.find("\"b\"").unwrap() < text.find("\"a\"").unwrap());
    }
}

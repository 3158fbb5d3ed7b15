//! Result shapers: reduce a rowset to a narrower structure.
//!
//! Every shaper keys on field *position* (first / second declared column of the
//! SELECT list), never on a column name.

use crate::row::{Row, value_key};
use serde_json::Value;
use std::collections::BTreeMap;

/// First row, if any.
pub fn row_shape(rows: Vec<Row>) -> Option<Row> {
    rows.into_iter().next()
}

/// First column of the first row, if any.
pub fn scalar_shape(rows: Vec<Row>) -> Option<Value> {
    row_shape(rows).and_then(|row| row.first().cloned())
}

/// First-column values of every row, in row order.
pub fn column_shape(rows: Vec<Row>) -> Vec<Value> {
    rows.into_iter()
        .map(|row| row.first().cloned().unwrap_or(Value::Null))
        .collect()
}

/// Rows keyed by their first-column value. Later duplicates overwrite earlier ones.
pub fn hash_shape(rows: Vec<Row>) -> BTreeMap<String, Row> {
    keyed_by(rows, |row| row.first().map(value_key))
}

/// Rows keyed by the value of a named column. Rows lacking the column are skipped.
pub fn hash_shape_by(rows: Vec<Row>, column: &str) -> BTreeMap<String, Row> {
    keyed_by(rows, |row| row.get(column).map(value_key))
}

/// First-column value mapped to second-column value.
pub fn key_value_shape(rows: Vec<Row>) -> BTreeMap<String, Value> {
    rows.into_iter()
        .filter_map(|row| {
            let key = value_key(row.first()?);
            let value = row.second().cloned().unwrap_or(Value::Null);
            Some((key, value))
        })
        .collect()
}

fn keyed_by(rows: Vec<Row>, key: impl Fn(&Row) -> Option<String>) -> BTreeMap<String, Row> {
    let mut out = BTreeMap::new();
    for row in rows {
        if let Some(k) = key(&row) {
            out.insert(k, row);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Row> {
        vec![
            Row::new().with("code", "UY").with("name", "Uygurian"),
            Row::new().with("code", "QW").with("name", "Qwertian"),
        ]
    }

    #[test]
    fn row_and_scalar() {
        assert_eq!(row_shape(rows()).unwrap().get_str("name").unwrap(), "Uygurian");
        assert_eq!(scalar_shape(rows()), Some(json!("UY")));
        assert_eq!(row_shape(vec![]), None);
        assert_eq!(scalar_shape(vec![]), None);
    }

    #[test]
    fn column() {
        assert_eq!(column_shape(rows()), vec![json!("UY"), json!("QW")]);
        assert!(column_shape(vec![]).is_empty());
    }

    #[test]
    fn hash_uses_first_field_regardless_of_name() {
        let rows = vec![
            Row::new().with("zzz", 2).with("aaa", "b"),
            Row::new().with("zzz", 1).with("aaa", "a"),
        ];
        let hash = hash_shape(rows);
        assert_eq!(hash["1"].get("aaa"), Some(&json!("a")));
        assert_eq!(hash["2"].get("aaa"), Some(&json!("b")));
    }

    #[test]
    fn hash_later_duplicates_win() {
        let rows = vec![
            Row::new().with("k", "x").with("v", 1),
            Row::new().with("k", "x").with("v", 2),
        ];
        let hash = hash_shape(rows);
        assert_eq!(hash.len(), 1);
        assert_eq!(hash["x"].get("v"), Some(&json!(2)));
    }

    #[test]
    fn hash_by_named_column() {
        let rows = vec![
            Row::new().with("Table", "t").with("Key_name", "PRIMARY"),
            Row::new().with("Table", "t").with("Key_name", "idx_name"),
        ];
        let hash = hash_shape_by(rows, "Key_name");
        assert_eq!(hash.keys().collect::<Vec<_>>(), ["PRIMARY", "idx_name"]);
    }

    #[test]
    fn key_value() {
        let kv = key_value_shape(rows());
        assert_eq!(kv["UY"], json!("Uygurian"));
        assert_eq!(kv["QW"], json!("Qwertian"));
    }

    #[test]
    fn key_value_single_column_maps_to_null() {
        let kv = key_value_shape(vec![Row::new().with("only", "k")]);
        assert_eq!(kv["k"], Value::Null);
    }
}

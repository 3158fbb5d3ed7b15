//! Ordered rows and value helpers.

use crate::error::{OrmError, OrmResult};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// An ordered mapping of field name to value.
///
/// Rows returned by execution keep the SELECT-list order, so "first field" always
/// means the first declared column. Rows passed to write operations may be in any
/// order: the table schema decides the emitted column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Row::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, replacing an existing value in place or appending a new field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Build a row from any serializable struct or map.
    ///
    /// Field order follows `serde_json`'s object ordering.
    pub fn from_serialize<T: Serialize>(value: &T) -> OrmResult<Self> {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Ok(map.into()),
            Ok(other) => Err(OrmError::decode(
                "<row>",
                format!("expected an object, got {other}"),
            )),
            Err(e) => Err(OrmError::decode("<row>", e.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Value of the first declared field.
    pub fn first(&self) -> Option<&Value> {
        self.fields.first().map(|(_, v)| v)
    }

    /// Value of the second declared field.
    pub fn second(&self) -> Option<&Value> {
        self.fields.get(1).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a field as a string, accepting textual and numeric values.
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.get(name).and_then(value_text)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.set(k, v);
        }
        row
    }
}

impl From<serde_json::Map<String, Value>> for Row {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Render a value as a map key: strings as-is, everything else in JSON form.
pub fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text form of a scalar value; `None` for NULL and compound values.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Interpret a value as an unsigned integer.
///
/// Backends using a text protocol report counts and ids as strings.
pub fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_keeps_position() {
        let mut row = Row::new().with("a", 1).with("b", 2);
        row.set("a", 3);
        let cols: Vec<_> = row.columns().collect();
        assert_eq!(cols, ["a", "b"]);
        assert_eq!(row.first(), Some(&json!(3)));
        assert_eq!(row.second(), Some(&json!(2)));
    }

    #[test]
    fn from_serialize_struct() {
        #[derive(serde::Serialize)]
        struct Lang {
            id: i64,
            name: &'static str,
        }

        let row = Row::from_serialize(&Lang { id: 1, name: "UY" }).unwrap();
        assert_eq!(row.get("id"), Some(&json!(1)));
        assert_eq!(row.get_str("name").as_deref(), Some("UY"));
    }

    #[test]
    fn from_serialize_rejects_scalars() {
        assert!(Row::from_serialize(&5).is_err());
    }

    #[test]
    fn serializes_in_field_order() {
        let row = Row::new().with("z", 1).with("a", "x");
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"z":1,"a":"x"}"#);
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(value_as_u64(&json!(3)), Some(3));
        assert_eq!(value_as_u64(&json!("12")), Some(12));
        assert_eq!(value_as_u64(&json!("x")), None);
        assert_eq!(value_as_u64(&json!(null)), None);
        assert_eq!(value_key(&json!(7)), "7");
        assert_eq!(value_key(&json!("k")), "k");
    }
}

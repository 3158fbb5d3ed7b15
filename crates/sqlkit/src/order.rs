//! ORDER BY fragments.
//!
//! Direction tokens are emitted verbatim. They must come from trusted call sites
//! (e.g. `"asc"` / `"desc"` literals in application code), never from user input.

use crate::ident::escape_identifier;

/// Ordered mapping of field name to direction token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderSpec {
    entries: Vec<(String, String)>,
}

impl OrderSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, direction: impl Into<String>) -> Self {
        self.entries.push((field.into(), direction.into()));
        self
    }

    pub fn asc(self, field: impl Into<String>) -> Self {
        self.with(field, "asc")
    }

    pub fn desc(self, field: impl Into<String>) -> Self {
        self.with(field, "desc")
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OrderSpec {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Compile to `field direction` pairs joined by `,`; empty spec gives `""`.
pub fn compile_order(spec: &OrderSpec, quote: char) -> String {
    spec.entries
        .iter()
        .map(|(field, direction)| format!("{} {}", escape_identifier(field, quote), direction))
        .collect::<Vec<_>>()
        .join(",")
}

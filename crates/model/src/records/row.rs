use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One untyped input row, keyed by lower-cased column name.
///
/// Values stay as raw strings; typing happens during normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    pub source: String,
    pub fields: HashMap<String, Option<String>>,
}

impl RowData {
    pub fn new(source: &str) -> Self {
        RowData {
            source: source.to_string(),
            fields: HashMap::new(),
        }
    }

    pub fn from_pairs<K, V, I>(source: &str, pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<Option<String>>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut row = RowData::new(source);
        for (key, value) in pairs {
            row.insert(key.as_ref(), value.into());
        }
        row
    }

    /// Inserts a field; the name is lower-cased and trimmed on the way in.
    pub fn insert(&mut self, field: &str, value: Option<String>) {
        self.fields.insert(field.trim().to_lowercase(), value);
    }

    /// Returns the trimmed value for `field`, treating blanks as missing.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(&field.to_lowercase())
            .and_then(|v| v.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Returns the first non-blank value among `aliases`, in order.
    pub fn first_of(&self, aliases: &[&str]) -> Option<&str> {
        aliases.iter().find_map(|alias| self.get(alias))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_missing() {
        let row = RowData::from_pairs(
            "test",
            [
                ("Order_ID", Some("  ".to_string())),
                ("id", Some(" 42 ".to_string())),
                ("email", None),
            ],
        );

        assert_eq!(row.get("order_id"), None);
        assert_eq!(row.get("email"), None);
        assert_eq!(row.first_of(&["order_id", "id"]), Some("42"));
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_first_of_prefers_earlier_alias() {
        let row = RowData::from_pairs(
            "test",
            [
                ("value", Some("10".to_string())),
                ("amount", Some("20".to_string())),
            ],
        );
        assert_eq!(row.first_of(&["value", "amount"]), Some("10"));
        assert_eq!(row.first_of(&["total"]), None);
    }
}

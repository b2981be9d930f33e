use anyhow::{anyhow, Result};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

use crate::data::value::CellValue;

/// Stable identity of a record, independent of its position in any view
pub type RowKey = String;

/// One record: a stable key plus an opaque field -> value mapping.
/// No schema is enforced; columns that name a missing field read as null.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    key: RowKey,
    values: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new(key: impl Into<RowKey>) -> Self {
        Self {
            key: key.into(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style field assignment
    pub fn with(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.values.get(field)
    }

    /// Value of a field, null when absent
    pub fn value(&self, field: &str) -> &CellValue {
        self.values.get(field).unwrap_or(&CellValue::Null)
    }

    /// Set a field, returning the previous value
    pub fn set(&mut self, field: impl Into<String>, value: CellValue) -> Option<CellValue> {
        self.values.insert(field.into(), value)
    }

    /// Drop a field, returning its value
    pub fn remove(&mut self, field: &str) -> Option<CellValue> {
        self.values.remove(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a record from a JSON object. The key comes from `key_field`;
    /// records without one fall back to their position in the source array.
    pub fn from_json(value: &JsonValue, key_field: &str, position: usize) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| anyhow!("Record {} is not a JSON object", position))?;

        let key = match obj.get(key_field) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Null) | None => format!("#{}", position),
            Some(other) => other.to_string(),
        };

        let values = obj
            .iter()
            .map(|(k, v)| (k.clone(), CellValue::from_json(v)))
            .collect();

        Ok(Self { key, values })
    }

    pub fn to_json(&self) -> JsonValue {
        let mut obj = Map::new();
        for (field, value) in &self.values {
            obj.insert(field.clone(), value.to_json());
        }
        JsonValue::Object(obj)
    }
}

/// Records loaded from a source, plus the field order the source declared
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub fields: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(fields: Vec<String>, records: Vec<Record>) -> Self {
        Self { fields, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, key: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.key() == key)
    }

    pub fn find_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_from_field() {
        let record = Record::from_json(&json!({"id": 7, "name": "Bob"}), "id", 0).unwrap();
        assert_eq!(record.key(), "7");
        assert_eq!(record.value("name"), &CellValue::text("Bob"));
        assert_eq!(record.value("missing"), &CellValue::Null);
    }

    #[test]
    fn test_key_falls_back_to_position() {
        let record = Record::from_json(&json!({"name": "Ann"}), "id", 3).unwrap();
        assert_eq!(record.key(), "#3");
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(Record::from_json(&json!([1, 2]), "id", 0).is_err());
    }

    #[test]
    fn test_json_round_trip_keeps_fields() {
        let source = json!({"id": "a", "tags": ["x", "y"], "done": false});
        let record = Record::from_json(&source, "id", 0).unwrap();
        assert_eq!(record.to_json(), source);
    }
}

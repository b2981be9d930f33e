use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Broad class of a cell value, used by inference and comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    Date,
    Text,
    List,
}

/// A single cell value in a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(String), // ISO 8601, kept as written
    List(Vec<CellValue>),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Empty means "nothing to show": null, blank text or an empty list
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) | CellValue::Date(s) => s.is_empty(),
            CellValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            CellValue::Null => ValueKind::Null,
            CellValue::Text(_) => ValueKind::Text,
            CellValue::Integer(_) => ValueKind::Integer,
            CellValue::Float(_) => ValueKind::Float,
            CellValue::Boolean(_) => ValueKind::Boolean,
            CellValue::Date(_) => ValueKind::Date,
            CellValue::List(_) => ValueKind::List,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            CellValue::Boolean(b) => *b,
            CellValue::Integer(i) => *i != 0,
            CellValue::Text(s) => !s.is_empty(),
            _ => false,
        }
    }

    /// Case-insensitive substring test against an already lowercased needle
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        if self.is_null() {
            return false;
        }
        self.to_string().to_lowercase().contains(needle)
    }

    /// Infer a value from raw text (CSV cells, free-form input)
    pub fn infer_from_str(raw: &str) -> Self {
        if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
            return CellValue::Null;
        }

        if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false") {
            return CellValue::Boolean(raw.eq_ignore_ascii_case("true"));
        }

        if let Ok(i) = raw.parse::<i64>() {
            return CellValue::Integer(i);
        }

        if let Ok(f) = raw.parse::<f64>() {
            return CellValue::Float(f);
        }

        if looks_like_date(raw) {
            return CellValue::Date(raw.to_string());
        }

        CellValue::Text(raw.to_string())
    }

    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => CellValue::Null,
            JsonValue::Bool(b) => CellValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Integer(i)
                } else {
                    CellValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            JsonValue::String(s) => CellValue::Text(s.clone()),
            JsonValue::Array(items) => CellValue::List(items.iter().map(Self::from_json).collect()),
            // Nested objects are opaque to the grid
            JsonValue::Object(_) => CellValue::Text(value.to_string()),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            CellValue::Null => JsonValue::Null,
            CellValue::Text(s) | CellValue::Date(s) => JsonValue::String(s.clone()),
            CellValue::Integer(i) => JsonValue::from(*i),
            CellValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            CellValue::Boolean(b) => JsonValue::Bool(*b),
            CellValue::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

fn looks_like_date(raw: &str) -> bool {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok() || DateTime::parse_from_rfc3339(raw).is_ok()
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Text(s) | CellValue::Date(s) => write!(f, "{}", s),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

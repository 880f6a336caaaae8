//! Value definitions
//!
//! Typed scalar values and the declared column types they are checked against.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Float,
    Text,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Integer => "INTEGER",
            DataType::Float => "FLOAT",
            DataType::Text => "TEXT",
        };
        f.write_str(name)
    }
}

/// A single typed scalar
///
/// Stored as a natural JSON scalar: `1`, `1.5`, `"text"` or `null`. Floats are
/// always written with a decimal point, so the tag survives a round-trip.
///
/// Equality and ordering are tag-aware: values of different tags are never
/// equal and have no order. `Null` equals `Null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Value {
    /// The declared type this value satisfies (`None` for Null)
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Integer(_) => Some(DataType::Integer),
            Value::Float(_) => Some(DataType::Float),
            Value::Text(_) => Some(DataType::Text),
            Value::Null => None,
        }
    }

    /// Human-readable tag name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::Text(_) => "TEXT",
            Value::Null => "NULL",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null conforms to every type; otherwise the tag must match
    pub fn conforms_to(&self, data_type: DataType) -> bool {
        match self.data_type() {
            Some(tag) => tag == data_type,
            None => true,
        }
    }

    /// Widen an integer literal bound to a FLOAT column.
    ///
    /// This is the only conversion the engine performs, and it happens once,
    /// where a literal meets its column.
    pub fn coerce_to(self, data_type: DataType) -> Value {
        match (self, data_type) {
            (Value::Integer(i), DataType::Float) => Value::Float(i as f64),
            (value, _) => value,
        }
    }

    /// Tag-aware comparison. Returns `None` across tags.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => Some(canonical(*a).total_cmp(&canonical(*b))),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }

    /// Total order for sorting result rows: Null first, then by tag, then by value
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        self.compare(other)
            .unwrap_or_else(|| self.tag_rank().cmp(&other.tag_rank()))
    }

    fn tag_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) => 1,
            Value::Float(_) => 2,
            Value::Text(_) => 3,
        }
    }
}

/// -0.0 and 0.0 are the same value
fn canonical(f: f64) -> f64 {
    if f == 0.0 {
        0.0
    } else {
        f
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => canonical(*f).to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Null => f.write_str("NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

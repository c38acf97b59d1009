use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

/// A single non-null cell. Missing values are modelled as `Option<Value>::None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

pub type Cell = Option<Value>;

// Floats compare by value with NaN equal to NaN so that exact-duplicate
// detection treats two identical rows as identical.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => canonical_bits(*f).hash(state),
            Value::Boolean(b) => b.hash(state),
        }
    }
}

fn canonical_bits(value: f64) -> u64 {
    if value.is_nan() {
        f64::NAN.to_bits()
    } else if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) | Value::Boolean(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the cell for CSV output. Whole floats keep a trailing `.0`.
    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Value::Boolean(b) => b.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

/// Converts a scalar JSON value into a cell. Returns `Err` with a short
/// description when the value is nested (array or object).
pub fn cell_from_json(value: &serde_json::Value) -> Result<Cell, String> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Bool(b) => Ok(Some(Value::Boolean(*b))),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(Value::Integer(i)))
            } else if let Some(f) = n.as_f64() {
                Ok(Some(Value::Float(f)))
            } else {
                Err(format!("number {n} is out of range"))
            }
        }
        serde_json::Value::String(s) => Ok(Some(Value::Text(s.clone()))),
        serde_json::Value::Array(_) => Err("nested array".to_string()),
        serde_json::Value::Object(_) => Err("nested object".to_string()),
    }
}

/// Parses a raw CSV field as `kind`. Text keeps an empty field as an empty
/// string; the other kinds read it as null.
pub fn parse_cell(raw: &str, kind: CellKind) -> Cell {
    match kind {
        CellKind::Text => Some(Value::Text(raw.to_string())),
        _ if raw.is_empty() => None,
        CellKind::Integer => raw.parse().ok().map(Value::Integer),
        CellKind::Float => raw.parse().ok().map(Value::Float),
        CellKind::Boolean => raw.parse().ok().map(Value::Boolean),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Text,
    Integer,
    Float,
    Boolean,
}

impl CellKind {
    pub fn of(value: &Value) -> CellKind {
        match value {
            Value::Text(_) => CellKind::Text,
            Value::Integer(_) => CellKind::Integer,
            Value::Float(_) => CellKind::Float,
            Value::Boolean(_) => CellKind::Boolean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn float_display_keeps_decimal_point() {
        assert_eq!(Value::Float(4.0).as_display(), "4.0");
        assert_eq!(Value::Float(29.99).as_display(), "29.99");
        assert_eq!(Value::Integer(4).as_display(), "4");
    }

    #[test]
    fn nan_equals_nan_for_dedup() {
        let mut set = HashSet::new();
        set.insert(Value::Float(f64::NAN));
        assert!(set.contains(&Value::Float(f64::NAN)));
        assert_eq!(Value::Float(-0.0), Value::Float(0.0));
        assert_ne!(Value::Integer(1), Value::Float(1.0));
    }

    #[test]
    fn cell_from_json_rejects_nested_values() {
        let json: serde_json::Value = serde_json::json!({"a": [1, 2]});
        assert!(cell_from_json(&json["a"]).is_err());
        assert_eq!(cell_from_json(&serde_json::json!(null)).unwrap(), None);
        assert_eq!(
            cell_from_json(&serde_json::json!(12)).unwrap(),
            Some(Value::Integer(12))
        );
        assert_eq!(
            cell_from_json(&serde_json::json!(1.5)).unwrap(),
            Some(Value::Float(1.5))
        );
    }

    #[test]
    fn digits_stay_text_when_the_kind_says_so() {
        assert_eq!(
            parse_cell("10260", CellKind::Text),
            Some(Value::from("10260"))
        );
        assert_eq!(
            parse_cell("10260", CellKind::Integer),
            Some(Value::Integer(10260))
        );
        assert_eq!(CellKind::of(&Value::Float(1.0)), CellKind::Float);
    }

    #[test]
    fn parse_cell_keeps_empty_text() {
        assert_eq!(
            parse_cell("", CellKind::Text),
            Some(Value::Text(String::new()))
        );
        assert_eq!(parse_cell("", CellKind::Float), None);
        assert_eq!(parse_cell("2.5", CellKind::Float), Some(Value::Float(2.5)));
    }
}

use serde::{Deserialize, Serialize};

/// A literal carried by a step: filter operands, fill values, replacements.
///
/// Deserializes from the matching JSON scalar (or array) directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Members of an `IN` list.
    ///
    /// Lists are taken as-is, a comma-separated string is split on commas,
    /// and any other scalar is a one-element list.
    pub fn list_items(&self) -> Vec<Value> {
        match self {
            Value::List(items) => items.clone(),
            Value::String(s) if s.contains(',') => s
                .split(',')
                .map(|part| Value::String(part.trim().to_string()))
                .collect(),
            Value::Null => Vec::new(),
            other => vec![other.clone()],
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json() {
        let v: Vec<Value> = serde_json::from_str(r#"[null, true, 3, 2.5, "x", ["a", 1]]"#).unwrap();
        assert_eq!(
            v,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(3),
                Value::Float(2.5),
                Value::String("x".into()),
                Value::List(vec![Value::String("a".into()), Value::Int(1)]),
            ]
        );
    }

    #[test]
    fn test_list_items_split_commas() {
        let v = Value::from("a, b,c");
        assert_eq!(
            v.list_items(),
            vec![Value::from("a"), Value::from("b"), Value::from("c")]
        );
        assert_eq!(Value::Int(4).list_items(), vec![Value::Int(4)]);
        assert!(Value::Null.list_items().is_empty());
    }
}

//! A typed, read-only tree of signals addressed by dotted paths.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    List(Vec<SignalValue>),
    Map(BTreeMap<String, SignalValue>),
}

impl SignalValue {
    pub fn map() -> Self {
        SignalValue::Map(BTreeMap::new())
    }

    /// Insert into a map node; silently ignored on any other variant.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SignalValue>) {
        if let SignalValue::Map(entries) = self {
            entries.insert(key.into(), value.into());
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<SignalValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty_map(&self) -> bool {
        matches!(self, SignalValue::Map(entries) if entries.is_empty())
    }

    /// One step down the tree: map key, or list index.
    pub fn child(&self, segment: &str) -> Option<&SignalValue> {
        match self {
            SignalValue::Map(entries) => entries.get(segment),
            SignalValue::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Numeric view used by `ge`/`le`. Text is parsed; booleans count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SignalValue::Integer(n) => Some(*n as f64),
            SignalValue::Number(n) => Some(*n),
            SignalValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            SignalValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SignalValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Equality with numbers compared by value, so `10` matches `10.0`.
    pub fn loosely_equals(&self, other: &SignalValue) -> bool {
        use SignalValue::{Integer, Number};
        match (self, other) {
            (Integer(_) | Number(_), Integer(_) | Number(_)) => self.as_f64() == other.as_f64(),
            (SignalValue::List(a), SignalValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loosely_equals(y))
            }
            _ => self == other,
        }
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Null => f.write_str("null"),
            SignalValue::Bool(b) => write!(f, "{}", b),
            SignalValue::Integer(n) => write!(f, "{}", n),
            SignalValue::Number(n) => write!(f, "{}", n),
            SignalValue::Text(s) => f.write_str(s),
            SignalValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            SignalValue::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<bool> for SignalValue {
    fn from(value: bool) -> Self {
        SignalValue::Bool(value)
    }
}

impl From<u8> for SignalValue {
    fn from(value: u8) -> Self {
        SignalValue::Integer(value as i64)
    }
}

impl From<i64> for SignalValue {
    fn from(value: i64) -> Self {
        SignalValue::Integer(value)
    }
}

impl From<f64> for SignalValue {
    fn from(value: f64) -> Self {
        SignalValue::Number(value)
    }
}

impl From<&str> for SignalValue {
    fn from(value: &str) -> Self {
        SignalValue::Text(value.to_string())
    }
}

impl From<String> for SignalValue {
    fn from(value: String) -> Self {
        SignalValue::Text(value)
    }
}

impl<T: Into<SignalValue>> From<Vec<T>> for SignalValue {
    fn from(values: Vec<T>) -> Self {
        SignalValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<SignalValue>> From<Option<T>> for SignalValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SignalValue::Null)
    }
}

impl From<&serde_json::Value> for SignalValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SignalValue::Null,
            serde_json::Value::Bool(b) => SignalValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => SignalValue::Integer(i),
                None => SignalValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => SignalValue::Text(s.clone()),
            serde_json::Value::Array(items) => {
                SignalValue::List(items.iter().map(SignalValue::from).collect())
            }
            serde_json::Value::Object(entries) => SignalValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), SignalValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// The signal tree for one chart at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalSet {
    root: SignalValue,
}

impl SignalSet {
    pub fn new(root: SignalValue) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &SignalValue {
        &self.root
    }

    /// Walk a dotted path such as `natal.dignity.Jupiter`. Any missing segment yields `None`.
    pub fn lookup(&self, path: &str) -> Option<&SignalValue> {
        path.split('.')
            .try_fold(&self.root, |node, segment| node.child(segment))
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single resolved variant value.
///
/// Boolean variants serialize as TOML/JSON booleans, single-valued variants as
/// strings and multi-valued variants as arrays of strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariantValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl VariantValue {
    pub fn text(s: impl Into<String>) -> Self {
        VariantValue::Text(s.into())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VariantValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            VariantValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True when `value` is the selected value (or one of them, for lists).
    pub fn has(&self, value: &str) -> bool {
        match self {
            VariantValue::Bool(b) => matches!((b, value), (true, "true") | (false, "false")),
            VariantValue::Text(s) => s == value,
            VariantValue::List(vs) => vs.iter().any(|v| v == value),
        }
    }
}

impl fmt::Display for VariantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantValue::Bool(b) => write!(f, "{b}"),
            VariantValue::Text(s) => f.write_str(s),
            VariantValue::List(vs) => f.write_str(&vs.join(",")),
        }
    }
}

impl From<bool> for VariantValue {
    fn from(b: bool) -> Self {
        VariantValue::Bool(b)
    }
}

impl From<&str> for VariantValue {
    fn from(s: &str) -> Self {
        VariantValue::Text(s.to_string())
    }
}

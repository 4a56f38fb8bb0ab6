use serde::{Deserialize, Serialize};

/// Environment operation applied before the configure phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvOp {
    /// Replace the variable.
    Set,
    /// Append to the variable, space separated.
    AppendFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvMutation {
    pub var: String,
    pub op: EnvOp,
    pub value: String,
}

impl EnvMutation {
    pub fn set(var: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            op: EnvOp::Set,
            value: value.into(),
        }
    }

    pub fn append_flags(var: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            op: EnvOp::AppendFlags,
            value: value.into(),
        }
    }

    /// Value of the variable after this mutation, given its current value.
    pub fn apply_to(&self, current: Option<&str>) -> String {
        match (self.op, current) {
            (EnvOp::Set, _) => self.value.clone(),
            (EnvOp::AppendFlags, Some(cur)) if !cur.is_empty() => {
                format!("{cur} {}", self.value)
            }
            (EnvOp::AppendFlags, _) => self.value.clone(),
        }
    }
}

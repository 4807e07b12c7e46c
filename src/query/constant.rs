//! Typed field values
//!
//! Constants carry a total order so that merge joins and B-tree indexes
//! agree on key ordering. Ordering is deterministic: Int < Str.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constant {
    /// Integer value
    Int(i64),
    /// String value
    Str(String),
}

impl Constant {
    /// Create an integer constant
    pub fn int(v: i64) -> Self {
        Constant::Int(v)
    }

    /// Create a string constant
    pub fn string(v: impl Into<String>) -> Self {
        Constant::Str(v.into())
    }

    /// Returns the integer payload, if any
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Constant::Int(v) => Some(*v),
            Constant::Str(_) => None,
        }
    }

    /// Returns the string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::Int(_) => None,
            Constant::Str(s) => Some(s),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{}", v),
            Constant::Str(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<i64> for Constant {
    fn from(v: i64) -> Self {
        Constant::Int(v)
    }
}

impl From<&str> for Constant {
    fn from(v: &str) -> Self {
        Constant::Str(v.to_string())
    }
}

impl From<String> for Constant {
    fn from(v: String) -> Self {
        Constant::Str(v)
    }
}

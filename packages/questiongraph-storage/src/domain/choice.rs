//! Typed edge conditions and the scalar values the graph stores.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Literal the legacy clients send when a transition has no condition.
pub const NO_CONDITION_SENTINEL: &str = "null";

/// A scalar property value as stored in (or returned from) the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl GraphValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GraphValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GraphValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Equality as the graph database evaluates `a = b`.
    ///
    /// Integers and floats compare numerically; every other pairing must be
    /// the same kind. `Null` never equals anything, including itself.
    pub fn graph_eq(&self, other: &GraphValue) -> bool {
        match (self, other) {
            (GraphValue::Null, _) | (_, GraphValue::Null) => false,
            (GraphValue::Bool(a), GraphValue::Bool(b)) => a == b,
            (GraphValue::Integer(a), GraphValue::Integer(b)) => a == b,
            (GraphValue::Float(a), GraphValue::Float(b)) => a == b,
            (GraphValue::Integer(a), GraphValue::Float(b))
            | (GraphValue::Float(b), GraphValue::Integer(a)) => (*a as f64) == *b,
            (GraphValue::String(a), GraphValue::String(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for GraphValue {
    fn from(s: &str) -> Self {
        GraphValue::String(s.to_string())
    }
}

impl From<String> for GraphValue {
    fn from(s: String) -> Self {
        GraphValue::String(s)
    }
}

impl From<i64> for GraphValue {
    fn from(i: i64) -> Self {
        GraphValue::Integer(i)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ChoiceError {
    #[error("choice must be a string, number, boolean or null, got {0}")]
    UnsupportedKind(&'static str),

    #[error("choice '{raw}' is not a valid {kind}")]
    Unparsable { raw: String, kind: ChoiceKind },
}

/// How a raw text segment should be read as a choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceKind {
    #[default]
    Text,
    Integer,
    Float,
    Boolean,
}

impl fmt::Display for ChoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChoiceKind::Text => "text",
            ChoiceKind::Integer => "integer",
            ChoiceKind::Float => "float",
            ChoiceKind::Boolean => "boolean",
        };
        write!(f, "{}", s)
    }
}

/// The value a transition is conditioned on
///
/// `NoCondition` marks the default transition. It is never bound as a null
/// parameter: queries drop the `choice` attribute or filter instead.
///
/// Deserializes from any JSON scalar. `null`, `""` and the legacy `"null"`
/// string all collapse to `NoCondition`.
///
/// # Examples
///
/// ```rust
/// use questiongraph_storage::domain::Choice;
///
/// let c: Choice = serde_json::from_str("\"yes\"").unwrap();
/// assert_eq!(c, Choice::Text("yes".into()));
///
/// let c: Choice = serde_json::from_str("\"null\"").unwrap();
/// assert!(c.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum Choice {
    #[default]
    NoCondition,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Choice {
    /// Text choice, normalising the empty string and the sentinel
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() || s == NO_CONDITION_SENTINEL {
            Choice::NoCondition
        } else {
            Choice::Text(s)
        }
    }

    /// Read a URL path segment as a choice of the given kind
    pub fn parse_segment(raw: &str, kind: ChoiceKind) -> Result<Self, ChoiceError> {
        if raw.is_empty() || raw == NO_CONDITION_SENTINEL {
            return Ok(Choice::NoCondition);
        }
        let unparsable = || ChoiceError::Unparsable {
            raw: raw.to_string(),
            kind,
        };
        match kind {
            ChoiceKind::Text => Ok(Choice::Text(raw.to_string())),
            ChoiceKind::Integer => raw.parse().map(Choice::Integer).map_err(|_| unparsable()),
            ChoiceKind::Float => match raw.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Choice::Float(f)),
                _ => Err(unparsable()),
            },
            ChoiceKind::Boolean => raw.parse().map(Choice::Bool).map_err(|_| unparsable()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Choice::NoCondition)
    }

    /// Value to bind as a query parameter, `None` for the default transition
    pub fn value(&self) -> Option<GraphValue> {
        match self {
            Choice::NoCondition => None,
            Choice::Text(s) => Some(GraphValue::String(s.clone())),
            Choice::Integer(i) => Some(GraphValue::Integer(*i)),
            Choice::Float(f) => Some(GraphValue::Float(*f)),
            Choice::Bool(b) => Some(GraphValue::Bool(*b)),
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::NoCondition => write!(f, "<none>"),
            Choice::Text(s) => write!(f, "'{}'", s),
            Choice::Integer(i) => write!(f, "{}", i),
            Choice::Float(x) => write!(f, "{}", x),
            Choice::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<GraphValue> for Choice {
    fn from(value: GraphValue) -> Self {
        match value {
            GraphValue::Null => Choice::NoCondition,
            GraphValue::Bool(b) => Choice::Bool(b),
            GraphValue::Integer(i) => Choice::Integer(i),
            GraphValue::Float(f) => Choice::Float(f),
            GraphValue::String(s) => Choice::Text(s),
        }
    }
}

impl TryFrom<serde_json::Value> for Choice {
    type Error = ChoiceError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Choice::NoCondition),
            Value::String(s) => Ok(Choice::text(s)),
            Value::Bool(b) => Ok(Choice::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Choice::Integer(i)),
                // u64 beyond i64 and real numbers both land here
                None => n
                    .as_f64()
                    .map(Choice::Float)
                    .ok_or(ChoiceError::UnsupportedKind("number")),
            },
            Value::Array(_) => Err(ChoiceError::UnsupportedKind("array")),
            Value::Object(_) => Err(ChoiceError::UnsupportedKind("object")),
        }
    }
}

impl From<Choice> for serde_json::Value {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::NoCondition => serde_json::Value::Null,
            Choice::Text(s) => serde_json::Value::String(s),
            Choice::Integer(i) => serde_json::Value::from(i),
            Choice::Float(f) => serde_json::Value::from(f),
            Choice::Bool(b) => serde_json::Value::Bool(b),
        }
    }
}

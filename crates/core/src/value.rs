//! The canonical value tree underlying [`NormalizedSpec`](crate::NormalizedSpec).
//!
//! Mappings are `BTreeMap`-backed so every walk over the IR is
//! deterministic. Conversion from raw YAML rejects constructs the engine
//! does not grade (non-string keys, custom tags) instead of guessing.

use crate::error::ParseError;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Maximum nesting depth accepted from a submission. Deeper trees are a
/// hostile or broken input, not a manifest a lesson would ever ask for.
pub const MAX_DEPTH: usize = 128;

/// A canonical YAML value. Scalars keep their parsed YAML type -- the
/// matcher and the schema type table are responsible for flagging
/// int-vs-string confusion, never for silently coercing it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    /// Human-readable YAML type name, used in discrepancy messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Sequence(_) | Value::Mapping(_))
    }

    /// Compact single-line rendering for feedback and logs. Strings are
    /// quoted so `"80"` and `80` stay distinguishable.
    pub fn render(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(x) => {
                // Keep a trailing .0 so floats never read as integers.
                if x.fract() == 0.0 && x.is_finite() {
                    format!("{:.1}", x)
                } else {
                    x.to_string()
                }
            }
            Value::String(s) => format!("\"{}\"", s),
            Value::Sequence(items) => {
                let parts: Vec<String> = items.iter().map(Value::render).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Mapping(m) => {
                let parts: Vec<String> =
                    m.iter().map(|(k, v)| format!("{}: {}", k, v.render())).collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }

    /// Stable ordering key for set-semantic list canonicalization.
    pub(crate) fn sort_key(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.render(),
        }
    }

    /// Convert a raw `serde_yaml` tree into the canonical form, enforcing
    /// string keys and the depth ceiling.
    pub fn from_yaml(raw: serde_yaml::Value) -> Result<Value, ParseError> {
        Self::from_yaml_at(raw, 0)
    }

    fn from_yaml_at(raw: serde_yaml::Value, depth: usize) -> Result<Value, ParseError> {
        if depth > MAX_DEPTH {
            return Err(ParseError::unsupported(
                "deep nesting",
                format!("document nests deeper than {} levels", MAX_DEPTH),
            ));
        }
        match raw {
            serde_yaml::Value::Null => Ok(Value::Null),
            serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(x) = n.as_f64() {
                    Ok(Value::Float(x))
                } else {
                    Err(ParseError::syntax(format!("unrepresentable number: {}", n)))
                }
            }
            serde_yaml::Value::String(s) => Ok(Value::String(s)),
            serde_yaml::Value::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(Self::from_yaml_at(item, depth + 1)?);
                }
                Ok(Value::Sequence(out))
            }
            serde_yaml::Value::Mapping(entries) => {
                let mut out = BTreeMap::new();
                for (key, value) in entries {
                    let key = match key {
                        serde_yaml::Value::String(s) => s,
                        other => {
                            return Err(ParseError::unsupported(
                                "non-string key",
                                format!("mapping keys must be strings, got {:?}", other),
                            ))
                        }
                    };
                    out.insert(key, Self::from_yaml_at(value, depth + 1)?);
                }
                Ok(Value::Mapping(out))
            }
            serde_yaml::Value::Tagged(tagged) => Err(ParseError::unsupported(
                "YAML tag",
                format!("custom tag '{}' is not graded", tagged.tag),
            )),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Mapping(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

//! Pattern tree: the untyped matcher document, closed into a tagged variant.
//!
//! Documents decode through `serde_yaml::Value`, which keeps `.inf` and `.nan`
//! as floats instead of folding them into null. Object keys keep declaration
//! order, so compiled conjunctions and first-failure errors are deterministic.

use std::fmt;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::Deserialize;
use serde_json::Value;

use crate::compile::TranslateError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "serde_yaml::Value")]
pub enum PatternNode {
    Object(IndexMap<String, PatternNode>),
    List(Vec<PatternNode>),
    String(String),
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    #[default]
    Null,
}

impl PatternNode {
    /// Type name used in `UnsupportedShape` diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PatternNode::Object(_) => "object",
            PatternNode::List(_) => "array",
            PatternNode::String(_) => "string",
            PatternNode::Bool(_) => "bool",
            PatternNode::Int(_) => "int64",
            PatternNode::Float(_) => "float64",
            PatternNode::Null => "null",
        }
    }
}

fn number(
    int: Option<i64>,
    unsigned: bool,
    float: Option<f64>,
    shown: &dyn fmt::Display,
) -> Result<PatternNode, TranslateError> {
    match (int, float) {
        (Some(i), _) => Ok(PatternNode::Int(i)),
        // no slot for integers past i64::MAX
        _ if unsigned => Err(TranslateError::UnsupportedShape("uint64".to_string())),
        (None, Some(f)) => Ok(PatternNode::Float(OrderedFloat(f))),
        (None, None) => Err(TranslateError::UnsupportedShape(format!("number {shown}"))),
    }
}

impl TryFrom<serde_yaml::Value> for PatternNode {
    type Error = TranslateError;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        use serde_yaml::Value as Yaml;

        Ok(match value {
            Yaml::Null => PatternNode::Null,
            Yaml::Bool(b) => PatternNode::Bool(b),
            Yaml::Number(n) => number(n.as_i64(), n.is_u64(), n.as_f64(), &n)?,
            Yaml::String(s) => PatternNode::String(s),
            Yaml::Sequence(xs) => PatternNode::List(
                xs.into_iter().map(PatternNode::try_from).collect::<Result<_, _>>()?,
            ),
            Yaml::Mapping(map) => {
                let mut fields = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    let Yaml::String(key) = k else {
                        return Err(TranslateError::UnsupportedShape("non-string object key".to_string()));
                    };
                    fields.insert(key, PatternNode::try_from(v)?);
                }
                PatternNode::Object(fields)
            }
            Yaml::Tagged(tagged) => {
                return Err(TranslateError::UnsupportedShape(format!("tagged value {}", tagged.tag)));
            }
        })
    }
}

impl TryFrom<Value> for PatternNode {
    type Error = TranslateError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => PatternNode::Null,
            Value::Bool(b) => PatternNode::Bool(b),
            Value::Number(n) => number(n.as_i64(), n.is_u64(), n.as_f64(), &n)?,
            Value::String(s) => PatternNode::String(s),
            Value::Array(xs) => PatternNode::List(
                xs.into_iter().map(PatternNode::try_from).collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => {
                let mut fields = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    fields.insert(k, PatternNode::try_from(v)?);
                }
                PatternNode::Object(fields)
            }
        })
    }
}

impl From<&str> for PatternNode {
    fn from(s: &str) -> Self {
        PatternNode::String(s.to_string())
    }
}

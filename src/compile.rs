//! Pattern → expression compiler.
//!
//! Walks a validation pattern and emits a guarded boolean expression: every
//! field access sits behind a presence check, so evaluating the result never
//! faults on an absent field.
//!
//! Design:
//! - Pure functions only. No state, no logging, no I/O; concurrent calls need
//!   no coordination.
//! - The first failure aborts the whole rule. No partial expression escapes.
//! - Object keys are visited in declaration order, which fixes both the
//!   conjunction order and which error surfaces first.
pub mod foreach;
pub mod map;
pub mod value;

use thiserror::Error;

use crate::expr::Expression;
use crate::path::FieldPath;
use crate::pattern::PatternNode;
use crate::policy::ValidateBlock;

pub use foreach::compile_for_each;
pub use map::compile_map;
pub use value::compile_value;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("unsupported pattern shape: {0}")]
    UnsupportedShape(String),
    #[error("unsupported validation type: only 'pattern' and 'foreach' are implemented")]
    UnsupportedRuleKind,
}

// ------------------------------ Rule shape -------------------------------- //

/// Which part of a `validate` block gets translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleShape {
    Pattern,
    ForEach,
}

impl RuleShape {
    /// A direct pattern wins over `foreach` when both are set; the `foreach`
    /// entries are then ignored. `None` when neither is present.
    pub fn select(validate: &ValidateBlock) -> Option<Self> {
        if validate.pattern.is_some() {
            Some(RuleShape::Pattern)
        } else if !validate.foreach.is_empty() {
            Some(RuleShape::ForEach)
        } else {
            None
        }
    }
}

// ------------------------------- Entry points ----------------------------- //

/// Translate one rule's `validate` block.
pub fn compile_rule(validate: &ValidateBlock) -> Result<Expression, TranslateError> {
    match (RuleShape::select(validate), &validate.pattern) {
        (Some(RuleShape::Pattern), Some(pattern)) => compile(pattern, &FieldPath::object()),
        (Some(RuleShape::ForEach), _) => compile_for_each(&validate.foreach),
        _ => Err(TranslateError::UnsupportedRuleKind),
    }
}

/// Translate any pattern node found at `path`.
pub fn compile(pattern: &PatternNode, path: &FieldPath) -> Result<Expression, TranslateError> {
    match pattern {
        PatternNode::Object(fields) => compile_map(fields, path),
        PatternNode::List(_) => Err(TranslateError::UnsupportedShape(
            "array patterns; use a for-each rule instead".to_string(),
        )),
        PatternNode::String(s) => Ok(compile_value(s, path)),
        PatternNode::Bool(b) => Ok(Expression::primary(format!("{path} == {b}"))),
        PatternNode::Int(i) => Ok(Expression::primary(format!("{path} == {i}"))),
        PatternNode::Float(f) if f.0.is_finite() => {
            // `{:?}` keeps the fraction (`3.0`), so the literal stays a double
            Ok(Expression::primary(format!("{path} == {:?}", f.0)))
        }
        PatternNode::Float(_) => Err(TranslateError::UnsupportedShape("non-finite float".to_string())),
        PatternNode::Null => Ok(Expression::primary(path.absence())),
    }
}

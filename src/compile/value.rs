//! Scalar string matchers.
//!
//! The wildcard forms are a closed set. Anything else is an exact-match
//! literal; no glob or regex matching is attempted.

use crate::expr::{Expression, quote};
use crate::path::FieldPath;

/// Never fails: every string has a translation.
pub fn compile_value(value: &str, path: &FieldPath) -> Expression {
    if is_image_field(path) {
        if let Some(expr) = image_matcher(value, path) {
            return expr;
        }
    }

    match value {
        // present and non-empty
        "?*" => Expression::and(vec![
            Expression::primary(path.presence()),
            Expression::primary(format!("{path} != ''")),
        ]),
        "*" => Expression::primary(path.presence()),
        "!*" => Expression::primary(path.absence()),
        _ => Expression::primary(format!("{path} == {}", quote(value))),
    }
}

fn is_image_field(path: &FieldPath) -> bool {
    path.to_string().contains("image")
}

fn image_matcher(value: &str, path: &FieldPath) -> Option<Expression> {
    if let Some(tag) = value.strip_prefix("!*:") {
        return Some(Expression::primary(format!("image({path}).tag != {}", quote(tag))));
    }
    if let Some(registry) = value.strip_suffix("/*") {
        if !value.contains('|') {
            return Some(Expression::primary(format!(
                "image({path}).registry == {}",
                quote(registry)
            )));
        }
    }
    None
}

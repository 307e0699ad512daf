//! Object patterns: one clause per key, joined with `&&`.
//!
//! Key syntax decides whether a field is required:
//! - `(name)` conditional: if present it must match, if absent the clause holds.
//! - `=(name)` equality: same meaning as conditional when validating.
//! - `X(name)` negation: the field must be absent; the value is ignored.
//! - `+(name)` add-if-absent: a mutation hint, validated like a plain key.
//! - `name` plain: the field must be present and match.
//!
//! Existence (`^(name)`) and global (`<(name)`) anchors only make sense
//! against list elements or sibling lookups and are rejected.

use indexmap::IndexMap;

use crate::compile::{TranslateError, compile};
use crate::expr::Expression;
use crate::path::FieldPath;
use crate::pattern::PatternNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key<'a> {
    Conditional(&'a str),
    Negation(&'a str),
    AddIfAbsent(&'a str),
    Plain(&'a str),
    Unsupported(&'static str),
}

impl<'a> Key<'a> {
    fn classify(key: &'a str) -> Self {
        if let Some(name) = anchored(key, "(") {
            return Key::Conditional(name);
        }
        if let Some(name) = anchored(key, "+(") {
            return Key::AddIfAbsent(name);
        }
        if let Some(name) = anchored(key, "=(") {
            return Key::Conditional(name);
        }
        if let Some(name) = anchored(key, "X(") {
            return Key::Negation(name);
        }
        if anchored(key, "^(").is_some() {
            return Key::Unsupported("existence anchor");
        }
        if anchored(key, "<(").is_some() {
            return Key::Unsupported("global anchor");
        }
        Key::Plain(key)
    }
}

fn anchored<'a>(key: &'a str, open: &str) -> Option<&'a str> {
    key.strip_prefix(open)?.strip_suffix(')')
}

pub fn compile_map(
    fields: &IndexMap<String, PatternNode>,
    path: &FieldPath,
) -> Result<Expression, TranslateError> {
    if fields.is_empty() {
        return Ok(Expression::truth());
    }

    let mut clauses = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        clauses.push(compile_entry(key, value, path)?);
    }

    let joined = Expression::and(clauses);
    Ok(if path.is_root() { joined } else { joined.parenthesized() })
}

fn compile_entry(key: &str, value: &PatternNode, path: &FieldPath) -> Result<Expression, TranslateError> {
    match Key::classify(key) {
        Key::Conditional(name) => {
            let field = path.child(name);
            let sub = compile(value, &field)?;
            Ok(Expression::or(Expression::primary(field.absence()), sub.parenthesized()))
        }
        Key::Negation(name) => Ok(Expression::primary(path.child(name).absence())),
        Key::AddIfAbsent(name) | Key::Plain(name) => {
            let field = path.child(name);
            let sub = compile(value, &field)?;
            Ok(Expression::and(vec![Expression::primary(field.presence()), sub]))
        }
        Key::Unsupported(what) => Err(TranslateError::UnsupportedShape(format!("{what} `{key}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: serde_json::Value) -> IndexMap<String, PatternNode> {
        match PatternNode::try_from(v).unwrap() {
            PatternNode::Object(fields) => fields,
            other => panic!("expected object, got {}", other.kind()),
        }
    }

    fn at_root(v: serde_json::Value) -> Result<String, TranslateError> {
        compile_map(&fields(v), &FieldPath::object()).map(Expression::into_string)
    }

    #[test]
    fn classify_keys() {
        assert_eq!(Key::classify("(app)"), Key::Conditional("app"));
        assert_eq!(Key::classify("=(app)"), Key::Conditional("app"));
        assert_eq!(Key::classify("+(app)"), Key::AddIfAbsent("app"));
        assert_eq!(Key::classify("X(hostPath)"), Key::Negation("hostPath"));
        assert_eq!(Key::classify("app"), Key::Plain("app"));
        assert_eq!(Key::classify("(app"), Key::Plain("(app"));
        assert!(matches!(Key::classify("^(name)"), Key::Unsupported(_)));
        assert!(matches!(Key::classify("<(name)"), Key::Unsupported(_)));
    }

    #[test]
    fn empty_map_is_true_anywhere() {
        assert_eq!(at_root(json!({})).unwrap(), "true");
        let nested = compile_map(&IndexMap::new(), &FieldPath::object().child("spec")).unwrap();
        assert_eq!(nested.as_str(), "true");
        assert_eq!(at_root(json!({"spec": {}})).unwrap(), "has(object.spec) && true");
    }

    #[test]
    fn plain_key_requires_presence() {
        assert_eq!(
            at_root(json!({"kind": "Pod"})).unwrap(),
            "has(object.kind) && object.kind == 'Pod'"
        );
    }

    #[test]
    fn add_if_absent_is_plain() {
        assert_eq!(at_root(json!({"+(kind)": "Pod"})).unwrap(), at_root(json!({"kind": "Pod"})).unwrap());
    }

    #[test]
    fn conditional_holds_when_absent() {
        assert_eq!(
            at_root(json!({"(kind)": "Pod"})).unwrap(),
            "!has(object.kind) || (object.kind == 'Pod')"
        );
    }

    #[test]
    fn conditional_object_value() {
        assert_eq!(
            at_root(json!({"(spec)": {"hostNetwork": false}})).unwrap(),
            "!has(object.spec) || ((has(object.spec.hostNetwork) && object.spec.hostNetwork == false))"
        );
    }

    #[test]
    fn negation_ignores_value() {
        assert_eq!(
            at_root(json!({"spec": {"X(hostPath)": "anything"}})).unwrap(),
            "has(object.spec) && (!has(object.spec.hostPath))"
        );
    }

    #[test]
    fn negation_accepts_any_value() {
        assert_eq!(at_root(json!({"X(hostPath)": [{"path": "/"}]})).unwrap(), "!has(object.hostPath)");
        assert_eq!(at_root(json!({"=(kind)": "Pod"})).unwrap(), at_root(json!({"(kind)": "Pod"})).unwrap());
    }

    #[test]
    fn nested_maps_are_parenthesized() {
        let expr = compile_map(&fields(json!({"a": 1, "b": 2})), &FieldPath::object().child("spec")).unwrap();
        assert_eq!(
            expr.as_str(),
            "(has(object.spec.a) && object.spec.a == 1 && has(object.spec.b) && object.spec.b == 2)"
        );
    }

    #[test]
    fn mixed_keys_keep_declaration_order_and_grouping() {
        assert_eq!(
            at_root(json!({"(a)": 1, "b": 2})).unwrap(),
            "(!has(object.a) || (object.a == 1)) && has(object.b) && object.b == 2"
        );
    }

    #[test]
    fn non_identifier_keys_use_index_syntax() {
        assert_eq!(
            at_root(json!({"metadata": {"labels": {"(app.kubernetes.io/name)": "?*"}}})).unwrap(),
            "has(object.metadata) && (has(object.metadata.labels) && \
             (!('app.kubernetes.io/name' in object.metadata.labels) || \
             ('app.kubernetes.io/name' in object.metadata.labels && \
             object.metadata.labels['app.kubernetes.io/name'] != '')))"
        );
    }

    #[test]
    fn first_error_in_declaration_order() {
        let err = at_root(json!({"a": [1], "^(b)": "x"})).unwrap_err();
        assert_eq!(
            err,
            TranslateError::UnsupportedShape("array patterns; use a for-each rule instead".to_string())
        );
        let err = at_root(json!({"^(b)": "x", "a": [1]})).unwrap_err();
        assert_eq!(err, TranslateError::UnsupportedShape("existence anchor `^(b)`".to_string()));
    }
}

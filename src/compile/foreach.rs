use crate::compile::{TranslateError, compile};
use crate::expr::Expression;
use crate::path::FieldPath;
use crate::policy::ForEach;

/// `!has(list) || list.all(element, <condition>)` per entry, joined with `&&`
/// in declaration order.
pub fn compile_for_each(specs: &[ForEach]) -> Result<Expression, TranslateError> {
    let mut clauses = Vec::with_capacity(specs.len());
    for spec in specs {
        // deny-only foreach entries carry no pattern
        let pattern = spec.pattern.as_ref().ok_or(TranslateError::UnsupportedRuleKind)?;
        let list = FieldPath::from_jmespath(&spec.list)?;
        let condition = compile(pattern, &FieldPath::element())?;
        clauses.push(Expression::or(
            Expression::primary(list.absence()),
            Expression::primary(format!("{list}.all({}, {condition})", FieldPath::ELEMENT)),
        ));
    }
    Ok(Expression::and(clauses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternNode;
    use serde_json::json;

    fn spec(list: &str, pattern: serde_json::Value) -> ForEach {
        ForEach {
            list: list.to_string(),
            pattern: Some(PatternNode::try_from(pattern).unwrap()),
        }
    }

    #[test]
    fn single_list() {
        let expr = compile_for_each(&[spec("request.object.spec.containers", json!({"image": "!*:latest"}))]).unwrap();
        assert_eq!(
            expr.as_str(),
            "!has(object.spec.containers) || object.spec.containers.all(element, \
             has(element.image) && image(element.image).tag != 'latest')"
        );
    }

    #[test]
    fn several_lists_keep_their_guards() {
        let expr = compile_for_each(&[
            spec("request.object.spec.containers", json!({"name": "*"})),
            spec("request.object.spec.initContainers", json!({"name": "*"})),
        ])
        .unwrap();
        assert_eq!(
            expr.as_str(),
            "(!has(object.spec.containers) || object.spec.containers.all(element, has(element.name) && has(element.name))) && \
             (!has(object.spec.initContainers) || object.spec.initContainers.all(element, has(element.name) && has(element.name)))"
        );
    }

    #[test]
    fn multi_key_element_pattern() {
        let expr = compile_for_each(&[spec(
            "request.object.spec.containers",
            json!({"(imagePullPolicy)": "Always", "name": "?*"}),
        )])
        .unwrap();
        assert_eq!(
            expr.as_str(),
            "!has(object.spec.containers) || object.spec.containers.all(element, \
             (!has(element.imagePullPolicy) || (element.imagePullPolicy == 'Always')) && \
             has(element.name) && has(element.name) && element.name != '')"
        );
    }

    #[test]
    fn first_failing_entry_wins() {
        let err = compile_for_each(&[
            spec("request.object.spec.containers", json!({"name": "*"})),
            spec("request.object.spec.volumes", json!([{"name": "*"}])),
            ForEach { list: "request.object.spec.initContainers".to_string(), pattern: None },
        ])
        .unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedShape(_)));
    }

    #[test]
    fn multi_select_list_is_rejected() {
        let err = compile_for_each(&[spec(
            "request.object.spec.[ephemeralContainers, initContainers, containers][]",
            json!({"image": "!*:latest"}),
        )])
        .unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedShape(ref what) if what.starts_with("list expression")));
    }

    #[test]
    fn wildcard_element_pattern_tests_the_bare_element() {
        let expr = compile_for_each(&[spec("request.object.spec.containers", json!("*"))]).unwrap();
        assert_eq!(
            expr.as_str(),
            "!has(object.spec.containers) || object.spec.containers.all(element, has(element))"
        );
    }

    #[test]
    fn entry_without_pattern() {
        let err = compile_for_each(&[ForEach {
            list: "request.object.spec.containers".to_string(),
            pattern: None,
        }])
        .unwrap_err();
        assert_eq!(err, TranslateError::UnsupportedRuleKind);
    }
}

//! Legacy policy → validating policy.
//!
//! Structural copy around the compiler: metadata, failure action and resource
//! filters are carried over; each rule's `validate` block becomes one
//! validation entry whose expression comes from [`compile_rule`].

use thiserror::Error;

use crate::compile::{TranslateError, compile_rule};
use crate::policy::{
    LegacyClusterPolicy, MatchBlock, MatchConstraints, ResourceRule, Validation, ValidatingPolicy,
    ValidatingSpec, ValidationAction,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("no rules found in the policy")]
    NoRules,
    #[error("error converting rule '{rule}': {source}")]
    Rule {
        rule: String,
        #[source]
        source: TranslateError,
    },
}

const LEGACY_KINDS: [&str; 2] = ["ClusterPolicy", "Policy"];

pub fn convert_policy(legacy: &LegacyClusterPolicy) -> Result<ValidatingPolicy, ConvertError> {
    let policy_name = legacy.metadata.name.as_str();
    let Some(first) = legacy.spec.rules.first() else {
        return Err(ConvertError::NoRules);
    };

    if !legacy.kind.is_empty() && !LEGACY_KINDS.contains(&legacy.kind.as_str()) {
        log::warn!("policy '{policy_name}' has kind '{}', converting it as a ClusterPolicy", legacy.kind);
    }
    // match/exclude only come from the first rule
    for rule in &legacy.spec.rules[1..] {
        if rule.match_ != first.match_ || rule.exclude != first.exclude {
            log::warn!(
                "policy '{policy_name}': rule '{}' has its own match/exclude block, which is not carried over",
                rule.name
            );
        }
    }

    let mut validations = Vec::with_capacity(legacy.spec.rules.len());
    for rule in &legacy.spec.rules {
        log::debug!("policy '{policy_name}': compiling rule '{}'", rule.name);
        let expression = compile_rule(&rule.validate).map_err(|source| ConvertError::Rule {
            rule: rule.name.clone(),
            source,
        })?;
        log::trace!("rule '{}' → {expression}", rule.name);
        validations.push(Validation {
            message: rule.validate.message.clone(),
            expression: expression.into_string(),
        });
    }

    Ok(ValidatingPolicy {
        api_version: ValidatingPolicy::API_VERSION.to_string(),
        kind: ValidatingPolicy::KIND.to_string(),
        metadata: legacy.metadata.clone(),
        spec: ValidatingSpec {
            validation_actions: vec![ValidationAction::from_failure_action(
                legacy.spec.validation_failure_action.as_deref(),
            )],
            background: legacy.spec.background,
            match_constraints: convert_match_block(policy_name, &first.match_),
            exclude_constraints: convert_match_block(policy_name, &first.exclude),
            validations,
        },
    })
}

/// First `any` filter's kinds become the resource list; groups, versions and
/// operations take fixed defaults.
pub fn convert_match_block(policy_name: &str, block: &MatchBlock) -> MatchConstraints {
    if !block.all.is_empty() {
        log::warn!("policy '{policy_name}': `all` resource filters are not converted");
    }
    if block.any.len() > 1 {
        log::warn!(
            "policy '{policy_name}': only the first of {} `any` resource filters is converted",
            block.any.len()
        );
    }

    let resource_rules = block
        .any
        .first()
        .map(|filter| ResourceRule {
            api_groups: vec![String::new()],
            api_versions: vec!["v1".to_string()],
            operations: vec!["CREATE".to_string(), "UPDATE".to_string()],
            resources: filter.resources.kinds.clone(),
        })
        .into_iter()
        .collect();

    MatchConstraints { resource_rules }
}

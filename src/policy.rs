//! Policy documents: the legacy input shape and the translated output shape.
//!
//! Only the fields the converter reads or writes are modelled; anything else
//! in an input document is ignored on decode.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::pattern::PatternNode;

// ------------------------------ Legacy (input) ---------------------------- //

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyClusterPolicy {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub spec: LegacySpec,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<IndexMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacySpec {
    #[serde(default)]
    pub validation_failure_action: Option<String>,
    #[serde(default)]
    pub background: Option<bool>,
    #[serde(default)]
    pub rules: Vec<LegacyRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyRule {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "match")]
    pub match_: MatchBlock,
    #[serde(default)]
    pub exclude: MatchBlock,
    /// Mutation and generation rules have no `validate` block; they decode as
    /// an empty one and fail translation.
    #[serde(default)]
    pub validate: ValidateBlock,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MatchBlock {
    #[serde(default)]
    pub any: Vec<ResourceFilter>,
    #[serde(default)]
    pub all: Vec<ResourceFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResourceFilter {
    #[serde(default)]
    pub resources: ResourceDescription,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResourceDescription {
    #[serde(default)]
    pub kinds: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ValidateBlock {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub pattern: Option<PatternNode>,
    #[serde(default)]
    pub foreach: Vec<ForEach>,
}

/// Applies `pattern` to every element of the list at `list`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForEach {
    pub list: String,
    #[serde(default)]
    pub pattern: Option<PatternNode>,
}

// ------------------------------ Target (output) --------------------------- //

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatingPolicy {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: ValidatingSpec,
}

impl ValidatingPolicy {
    pub const API_VERSION: &'static str = "policies.kyverno.io/v1alpha1";
    pub const KIND: &'static str = "ValidatingPolicy";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatingSpec {
    pub validation_actions: Vec<ValidationAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<bool>,
    pub match_constraints: MatchConstraints,
    #[serde(rename = "exclude", skip_serializing_if = "MatchConstraints::is_empty")]
    pub exclude_constraints: MatchConstraints,
    pub validations: Vec<Validation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationAction {
    Deny,
    Audit,
}

impl ValidationAction {
    /// `enforce` in any case is `Deny`; anything else, including no value, is `Audit`.
    pub fn from_failure_action(action: Option<&str>) -> Self {
        match action {
            Some(a) if a.eq_ignore_ascii_case("enforce") => ValidationAction::Deny,
            _ => ValidationAction::Audit,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConstraints {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_rules: Vec<ResourceRule>,
}

impl MatchConstraints {
    pub fn is_empty(&self) -> bool {
        self.resource_rules.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRule {
    pub api_groups: Vec<String>,
    pub api_versions: Vec<String>,
    pub operations: Vec<String>,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub message: String,
    pub expression: String,
}

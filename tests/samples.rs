//! Replays every `samples/*.yaml` policy against its `.cel` expectations.

use std::path::{Path, PathBuf};

use pattern_cel::convert_policy;
use pattern_cel::path_de::policies_from_str;

fn samples_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("samples")
}

fn expectations(path: &Path) -> Vec<(String, String)> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.starts_with('#'))
        .map(|l| {
            let (rule, expr) = l.split_once(": ").expect("expected `rule: expression`");
            (rule.to_string(), expr.to_string())
        })
        .collect()
}

#[test]
fn samples_match_expectations() {
    let mut checked = 0;
    for entry in std::fs::read_dir(samples_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        let expected = expectations(&path.with_extension("cel"));
        let source = std::fs::read_to_string(&path).unwrap();
        let policies = policies_from_str(&source).unwrap();
        assert_eq!(policies.len(), 1, "{}", path.display());

        let legacy = &policies[0];
        let converted = convert_policy(legacy).unwrap();
        let actual: Vec<(String, String)> = legacy
            .spec
            .rules
            .iter()
            .zip(&converted.spec.validations)
            .map(|(rule, v)| (rule.name.clone(), v.expression.clone()))
            .collect();
        assert_eq!(actual, expected, "{}", path.display());
        checked += 1;
    }
    assert!(checked >= 4, "only {checked} samples found");
}

#[test]
fn converted_samples_serialize() {
    let source = std::fs::read_to_string(samples_dir().join("require-labels.yaml")).unwrap();
    let legacy = &policies_from_str(&source).unwrap()[0];
    let yaml = serde_yaml::to_string(&convert_policy(legacy).unwrap()).unwrap();

    assert!(yaml.starts_with("apiVersion: policies.kyverno.io/v1alpha1\nkind: ValidatingPolicy\n"));
    assert!(yaml.contains("- Audit"));
    assert!(yaml.contains("exclude:"));
    assert!(yaml.contains("- Job"));
    assert!(!yaml.contains("background"));
}

//! Structural diff between a submitted manifest IR and an expected one.
//!
//! The walk reports discrepancies at leaf granularity so counting is
//! stable: a whole missing subtree surfaces as one discrepancy per
//! expected leaf, which keeps the score denominator and the feedback
//! paths aligned (`spec.replicas`, not `spec`).

use crate::rules;
use crate::types::{DiscrepancyKind, FieldDiscrepancy, Severity};
use kubedrill_core::{Budget, DeadlineExceeded, FieldPath, NormalizedSpec, Value};
use kubedrill_exercise::MatchRule;

/// Diff `submitted` against `expected` under the criterion's rules.
/// Schema type violations recorded during normalization are folded in as
/// blocking type mismatches, taking precedence over same-path diffs.
pub fn diff_manifest(
    budget: &Budget,
    submitted: &NormalizedSpec,
    expected: &NormalizedSpec,
    match_rules: &[MatchRule],
) -> Result<Vec<FieldDiscrepancy>, DeadlineExceeded> {
    let mut out = Vec::new();

    for violation in &submitted.violations {
        out.push(FieldDiscrepancy {
            path: violation.path.clone(),
            kind: DiscrepancyKind::TypeMismatch,
            severity: Severity::Blocking,
            expected_shape: Some(violation.expected.to_string()),
            expected_value: None,
            actual: Some(violation.value.clone()),
            group: None,
        });
    }

    walk(
        budget,
        &expected.root,
        Some(&submitted.root),
        &FieldPath::root(),
        match_rules,
        &mut out,
    )?;

    dedupe_by_path(&mut out);
    out.sort_by(|a, b| a.severity.cmp(&b.severity).then_with(|| a.path.cmp(&b.path)));
    Ok(out)
}

/// Scalar leaves (and empty containers) in the expected tree; the score
/// denominator.
pub fn leaf_count(node: &Value) -> usize {
    match node {
        Value::Mapping(map) if !map.is_empty() => map.values().map(leaf_count).sum(),
        Value::Sequence(items) if !items.is_empty() => items.iter().map(leaf_count).sum(),
        _ => 1,
    }
}

fn walk(
    budget: &Budget,
    expected: &Value,
    actual: Option<&Value>,
    path: &FieldPath,
    match_rules: &[MatchRule],
    out: &mut Vec<FieldDiscrepancy>,
) -> Result<(), DeadlineExceeded> {
    budget.check()?;

    let Some(actual) = actual else {
        report_missing(budget, expected, path, match_rules, out)?;
        return Ok(());
    };

    match (expected, actual) {
        (Value::Mapping(expected_map), Value::Mapping(actual_map)) => {
            for (key, expected_child) in expected_map {
                walk(
                    budget,
                    expected_child,
                    actual_map.get(key),
                    &path.child(key),
                    match_rules,
                    out,
                )?;
            }
            for (key, actual_child) in actual_map {
                if !expected_map.contains_key(key) {
                    report_extra(budget, actual_child, &path.child(key), match_rules, out)?;
                }
            }
        }
        (Value::Sequence(expected_items), Value::Sequence(actual_items)) => {
            for (i, expected_item) in expected_items.iter().enumerate() {
                walk(
                    budget,
                    expected_item,
                    actual_items.get(i),
                    &path.item(i),
                    match_rules,
                    out,
                )?;
            }
            for (i, actual_item) in actual_items.iter().enumerate().skip(expected_items.len()) {
                report_extra(budget, actual_item, &path.item(i), match_rules, out)?;
            }
        }
        (expected, actual) if expected.type_name() == actual.type_name() => {
            if expected != actual {
                let (severity, group) = rules::expected_disposition(match_rules, path);
                out.push(FieldDiscrepancy {
                    path: path.clone(),
                    kind: DiscrepancyKind::ValueMismatch,
                    severity,
                    expected_shape: Some(expected.type_name().to_string()),
                    expected_value: Some(expected.render()),
                    actual: Some(actual.render()),
                    group,
                });
            }
        }
        (expected, actual) => {
            let (severity, group) = rules::expected_disposition(match_rules, path);
            out.push(FieldDiscrepancy {
                path: path.clone(),
                kind: DiscrepancyKind::TypeMismatch,
                severity,
                expected_shape: Some(expected.type_name().to_string()),
                expected_value: Some(expected.render()),
                actual: Some(actual.render()),
                group,
            });
        }
    }
    Ok(())
}

/// The submission lacks this expected subtree; report its leaves.
fn report_missing(
    budget: &Budget,
    expected: &Value,
    path: &FieldPath,
    match_rules: &[MatchRule],
    out: &mut Vec<FieldDiscrepancy>,
) -> Result<(), DeadlineExceeded> {
    budget.check()?;
    match expected {
        Value::Mapping(map) if !map.is_empty() => {
            for (key, child) in map {
                report_missing(budget, child, &path.child(key), match_rules, out)?;
            }
        }
        Value::Sequence(items) if !items.is_empty() => {
            for (i, item) in items.iter().enumerate() {
                report_missing(budget, item, &path.item(i), match_rules, out)?;
            }
        }
        leaf => {
            let (severity, group) = rules::expected_disposition(match_rules, path);
            out.push(FieldDiscrepancy {
                path: path.clone(),
                kind: DiscrepancyKind::Missing,
                severity,
                expected_shape: Some(leaf.type_name().to_string()),
                expected_value: Some(leaf.render()),
                actual: None,
                group,
            });
        }
    }
    Ok(())
}

/// The submission has a subtree the expected answer lacks. Forbidden
/// paths stop the recursion at the forbidden node itself.
fn report_extra(
    budget: &Budget,
    actual: &Value,
    path: &FieldPath,
    match_rules: &[MatchRule],
    out: &mut Vec<FieldDiscrepancy>,
) -> Result<(), DeadlineExceeded> {
    budget.check()?;
    if rules::is_forbidden(match_rules, path) {
        let (kind, severity, group) = rules::extra_disposition(match_rules, path);
        out.push(FieldDiscrepancy {
            path: path.clone(),
            kind,
            severity,
            expected_shape: None,
            expected_value: None,
            actual: Some(actual.render()),
            group,
        });
        return Ok(());
    }
    match actual {
        Value::Mapping(map) if !map.is_empty() => {
            for (key, child) in map {
                report_extra(budget, child, &path.child(key), match_rules, out)?;
            }
        }
        Value::Sequence(items) if !items.is_empty() => {
            for (i, item) in items.iter().enumerate() {
                report_extra(budget, item, &path.item(i), match_rules, out)?;
            }
        }
        leaf => {
            let (kind, severity, group) = rules::extra_disposition(match_rules, path);
            out.push(FieldDiscrepancy {
                path: path.clone(),
                kind,
                severity,
                expected_shape: None,
                expected_value: None,
                actual: Some(leaf.render()),
                group,
            });
        }
    }
    Ok(())
}

/// Keep the first discrepancy per path; normalization violations were
/// pushed first, so they win over same-path diff findings.
fn dedupe_by_path(out: &mut Vec<FieldDiscrepancy>) {
    let mut seen: Vec<FieldPath> = Vec::new();
    out.retain(|discrepancy| {
        if seen.contains(&discrepancy.path) {
            false
        } else {
            seen.push(discrepancy.path.clone());
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubedrill_core::normalize;
    use kubedrill_exercise::{Requirement, MatchRule};
    use kubedrill_core::PathPattern;

    const EXPECTED: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  replicas: 3
  template:
    spec:
      containers:
        - name: app
          image: nginx:1.25
";

    fn rule(pattern: &str, requirement: Requirement) -> MatchRule {
        MatchRule {
            pattern: PathPattern::parse(pattern).unwrap(),
            requirement,
            group: None,
        }
    }

    #[test]
    fn identical_manifests_have_no_discrepancies() {
        let expected = normalize(EXPECTED).unwrap();
        let submitted = normalize(EXPECTED).unwrap();
        let diffs =
            diff_manifest(&Budget::unlimited(), &submitted, &expected, &[]).unwrap();
        assert!(diffs.is_empty());
    }

    #[test]
    fn missing_replicas_reports_the_leaf_path() {
        let expected = normalize(EXPECTED).unwrap();
        let submitted = normalize(
            "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  template:
    spec:
      containers:
        - name: app
          image: nginx:1.25
",
        )
        .unwrap();
        let diffs =
            diff_manifest(&Budget::unlimited(), &submitted, &expected, &[]).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DiscrepancyKind::Missing);
        assert_eq!(diffs[0].severity, Severity::Blocking);
        assert_eq!(diffs[0].path.to_string(), "spec.replicas");
    }

    #[test]
    fn optional_rule_downgrades_to_advisory() {
        let expected = normalize(EXPECTED).unwrap();
        let submitted = normalize(&EXPECTED.replace("replicas: 3", "replicas: 2")).unwrap();
        let diffs = diff_manifest(
            &Budget::unlimited(),
            &submitted,
            &expected,
            &[rule("spec.replicas", Requirement::Optional)],
        )
        .unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DiscrepancyKind::ValueMismatch);
        assert_eq!(diffs[0].severity, Severity::Advisory);
    }

    #[test]
    fn harmless_extras_are_advisory() {
        let expected = normalize(EXPECTED).unwrap();
        let submitted = normalize(&format!("{}  revisionHistoryLimit: 5\n", EXPECTED)).unwrap();
        let diffs =
            diff_manifest(&Budget::unlimited(), &submitted, &expected, &[]).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DiscrepancyKind::Unexpected);
        assert_eq!(diffs[0].severity, Severity::Advisory);
    }

    #[test]
    fn forbidden_extra_is_blocking_at_the_forbidden_node() {
        let expected = normalize(EXPECTED).unwrap();
        let submitted = normalize(&format!("{}      hostNetwork: true\n", EXPECTED)).unwrap();
        let diffs = diff_manifest(
            &Budget::unlimited(),
            &submitted,
            &expected,
            &[rule("**.hostNetwork", Requirement::Forbidden)],
        )
        .unwrap();
        let forbidden: Vec<_> = diffs
            .iter()
            .filter(|d| d.kind == DiscrepancyKind::Forbidden)
            .collect();
        assert_eq!(forbidden.len(), 1);
        assert_eq!(forbidden[0].severity, Severity::Blocking);
    }

    #[test]
    fn int_vs_string_is_a_type_mismatch() {
        let expected = normalize(
            "\
apiVersion: v1
kind: ConfigMap
metadata:
  name: settings
data:
  retries: \"3\"
",
        )
        .unwrap();
        let submitted_raw = "\
apiVersion: v1
kind: ConfigMap
metadata:
  name: settings
data:
  retries: 3
";
        let submitted = normalize(submitted_raw).unwrap();
        let diffs =
            diff_manifest(&Budget::unlimited(), &submitted, &expected, &[]).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DiscrepancyKind::TypeMismatch);
        assert_eq!(diffs[0].path.to_string(), "data.retries");
    }

    #[test]
    fn blocking_discrepancies_sort_first() {
        let expected = normalize(EXPECTED).unwrap();
        let submitted = normalize(
            "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  labels:
    extra: yes-indeed
spec:
  template:
    spec:
      containers:
        - name: app
          image: nginx:1.25
",
        )
        .unwrap();
        let diffs =
            diff_manifest(&Budget::unlimited(), &submitted, &expected, &[]).unwrap();
        assert!(diffs.len() >= 2);
        assert_eq!(diffs[0].severity, Severity::Blocking);
        assert_eq!(diffs.last().map(|d| d.severity), Some(Severity::Advisory));
    }

    #[test]
    fn leaf_count_counts_scalars() {
        let spec = normalize(EXPECTED).unwrap();
        // apiVersion, kind, metadata.name, spec.replicas, and the
        // container/template fields including applied defaults.
        assert!(leaf_count(&spec.root) >= 8);
    }
}

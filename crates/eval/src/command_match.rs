//! Intent comparison for command exercises.
//!
//! Verb and resource kind are always blocking -- `create` vs `apply` is
//! exactly the distinction these exercises teach. Flags follow the
//! criterion's rules (required/optional/forbidden); unknown extras are
//! advisory.

use crate::rules;
use crate::types::{DiscrepancyKind, FieldDiscrepancy, Severity};
use kubedrill_core::{Budget, CommandIntent, DeadlineExceeded, FieldPath};
use kubedrill_exercise::MatchRule;

/// Diff a submitted intent against an expected one.
pub fn diff_command(
    budget: &Budget,
    submitted: &CommandIntent,
    expected: &CommandIntent,
    match_rules: &[MatchRule],
) -> Result<Vec<FieldDiscrepancy>, DeadlineExceeded> {
    budget.check()?;
    let mut out = Vec::new();

    if submitted.verb != expected.verb {
        out.push(FieldDiscrepancy {
            path: FieldPath::root().child("verb"),
            kind: DiscrepancyKind::ValueMismatch,
            severity: Severity::Blocking,
            expected_shape: Some("verb".to_string()),
            expected_value: Some(expected.verb.clone()),
            actual: Some(submitted.verb.clone()),
            group: None,
        });
    }

    diff_optional_field(
        "resource",
        Severity::Blocking,
        expected.resource_kind.as_deref(),
        submitted.resource_kind.as_deref(),
        match_rules,
        &mut out,
    );

    let name_path = FieldPath::root().child("name");
    let (name_severity, name_group) = rules::expected_disposition(match_rules, &name_path);
    diff_named_field(
        name_path,
        name_severity,
        name_group,
        expected.name.as_deref(),
        submitted.name.as_deref(),
        &mut out,
    );

    let flags_root = FieldPath::root().child("flags");
    for (key, expected_value) in &expected.flags {
        budget.check()?;
        let path = flags_root.child(key);
        let (severity, group) = rules::expected_disposition(match_rules, &path);
        match submitted.flags.get(key) {
            None => out.push(FieldDiscrepancy {
                path,
                kind: DiscrepancyKind::Missing,
                severity,
                expected_shape: Some("flag".to_string()),
                expected_value: Some(expected_value.render()),
                actual: None,
                group,
            }),
            Some(actual) if actual != expected_value => out.push(FieldDiscrepancy {
                path,
                kind: DiscrepancyKind::ValueMismatch,
                severity,
                expected_shape: Some("flag".to_string()),
                expected_value: Some(expected_value.render()),
                actual: Some(actual.render()),
                group,
            }),
            Some(_) => {}
        }
    }
    for (key, actual_value) in &submitted.flags {
        budget.check()?;
        if expected.flags.contains_key(key) {
            continue;
        }
        let path = flags_root.child(key);
        let (kind, severity, group) = rules::extra_disposition(match_rules, &path);
        out.push(FieldDiscrepancy {
            path,
            kind,
            severity,
            expected_shape: None,
            expected_value: None,
            actual: Some(actual_value.render()),
            group,
        });
    }

    let args_root = FieldPath::root().child("args");
    for (i, expected_arg) in expected.positional_args.iter().enumerate() {
        let path = args_root.item(i);
        let (severity, group) = rules::expected_disposition(match_rules, &path);
        match submitted.positional_args.get(i) {
            None => out.push(FieldDiscrepancy {
                path,
                kind: DiscrepancyKind::Missing,
                severity,
                expected_shape: Some("argument".to_string()),
                expected_value: Some(expected_arg.clone()),
                actual: None,
                group,
            }),
            Some(actual) if actual != expected_arg => out.push(FieldDiscrepancy {
                path,
                kind: DiscrepancyKind::ValueMismatch,
                severity,
                expected_shape: Some("argument".to_string()),
                expected_value: Some(expected_arg.clone()),
                actual: Some(actual.clone()),
                group,
            }),
            Some(_) => {}
        }
    }
    for (i, actual_arg) in submitted
        .positional_args
        .iter()
        .enumerate()
        .skip(expected.positional_args.len())
    {
        let path = args_root.item(i);
        let (kind, severity, group) = rules::extra_disposition(match_rules, &path);
        out.push(FieldDiscrepancy {
            path,
            kind,
            severity,
            expected_shape: None,
            expected_value: None,
            actual: Some(actual_arg.clone()),
            group,
        });
    }

    out.sort_by(|a, b| a.severity.cmp(&b.severity).then_with(|| a.path.cmp(&b.path)));
    Ok(out)
}

/// The score denominator for a command criterion: every field the
/// expected intent pins down.
pub fn intent_leaf_count(expected: &CommandIntent) -> usize {
    1 + usize::from(expected.resource_kind.is_some())
        + usize::from(expected.name.is_some())
        + expected.flags.len()
        + expected.positional_args.len()
}

/// Fixed-severity field that both intents may or may not carry.
fn diff_optional_field(
    field: &str,
    severity: Severity,
    expected: Option<&str>,
    actual: Option<&str>,
    match_rules: &[MatchRule],
    out: &mut Vec<FieldDiscrepancy>,
) {
    let path = FieldPath::root().child(field);
    match (expected, actual) {
        (Some(e), Some(a)) if e != a => out.push(FieldDiscrepancy {
            path,
            kind: DiscrepancyKind::ValueMismatch,
            severity,
            expected_shape: Some(field.to_string()),
            expected_value: Some(e.to_string()),
            actual: Some(a.to_string()),
            group: None,
        }),
        (Some(e), None) => out.push(FieldDiscrepancy {
            path,
            kind: DiscrepancyKind::Missing,
            severity,
            expected_shape: Some(field.to_string()),
            expected_value: Some(e.to_string()),
            actual: None,
            group: None,
        }),
        (None, Some(a)) => {
            let (kind, extra_severity, group) = rules::extra_disposition(match_rules, &path);
            out.push(FieldDiscrepancy {
                path,
                kind,
                severity: extra_severity,
                expected_shape: None,
                expected_value: None,
                actual: Some(a.to_string()),
                group,
            });
        }
        _ => {}
    }
}

/// Rule-governed severity variant, used for the object name.
fn diff_named_field(
    path: FieldPath,
    severity: Severity,
    group: Option<String>,
    expected: Option<&str>,
    actual: Option<&str>,
    out: &mut Vec<FieldDiscrepancy>,
) {
    match (expected, actual) {
        (Some(e), Some(a)) if e != a => out.push(FieldDiscrepancy {
            path,
            kind: DiscrepancyKind::ValueMismatch,
            severity,
            expected_shape: Some("name".to_string()),
            expected_value: Some(e.to_string()),
            actual: Some(a.to_string()),
            group,
        }),
        (Some(e), None) => out.push(FieldDiscrepancy {
            path,
            kind: DiscrepancyKind::Missing,
            severity,
            expected_shape: Some("name".to_string()),
            expected_value: Some(e.to_string()),
            actual: None,
            group,
        }),
        (None, Some(a)) => out.push(FieldDiscrepancy {
            path,
            kind: DiscrepancyKind::Unexpected,
            severity: Severity::Advisory,
            expected_shape: None,
            expected_value: None,
            actual: Some(a.to_string()),
            group,
        }),
        _ => {}
    }
}

//! Match-rule resolution: which authored rule governs a path, and what
//! that means for a discrepancy found there.

use crate::types::{DiscrepancyKind, Severity};
use kubedrill_core::FieldPath;
use kubedrill_exercise::{MatchRule, Requirement};

/// The most specific rule whose pattern covers `path`, if any.
pub fn governing_rule<'a>(rules: &'a [MatchRule], path: &FieldPath) -> Option<&'a MatchRule> {
    rules
        .iter()
        .filter(|rule| rule.pattern.matches(path))
        .max_by_key(|rule| rule.pattern.specificity())
}

/// Severity and group for a discrepancy on a path the expected answer
/// contains. Unruled paths default to required.
pub fn expected_disposition(rules: &[MatchRule], path: &FieldPath) -> (Severity, Option<String>) {
    match governing_rule(rules, path) {
        Some(rule) => {
            let severity = match rule.requirement {
                Requirement::Optional => Severity::Advisory,
                Requirement::Required | Requirement::Forbidden => Severity::Blocking,
            };
            (severity, rule.group.clone())
        }
        None => (Severity::Blocking, None),
    }
}

/// Kind, severity, and group for a path present only in the submission.
/// Harmless extras are advisory; explicitly forbidden paths are blocking.
pub fn extra_disposition(
    rules: &[MatchRule],
    path: &FieldPath,
) -> (DiscrepancyKind, Severity, Option<String>) {
    match governing_rule(rules, path) {
        Some(rule) if rule.requirement == Requirement::Forbidden => {
            (DiscrepancyKind::Forbidden, Severity::Blocking, rule.group.clone())
        }
        Some(rule) => (DiscrepancyKind::Unexpected, Severity::Advisory, rule.group.clone()),
        None => (DiscrepancyKind::Unexpected, Severity::Advisory, None),
    }
}

/// Is the path explicitly forbidden by a governing rule?
pub fn is_forbidden(rules: &[MatchRule], path: &FieldPath) -> bool {
    matches!(
        governing_rule(rules, path),
        Some(rule) if rule.requirement == Requirement::Forbidden
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubedrill_core::PathPattern;

    fn rule(pattern: &str, requirement: Requirement, group: Option<&str>) -> MatchRule {
        MatchRule {
            pattern: PathPattern::parse(pattern).unwrap(),
            requirement,
            group: group.map(str::to_string),
        }
    }

    #[test]
    fn most_specific_rule_wins() {
        let rules = vec![
            rule("metadata.labels.*", Requirement::Optional, None),
            rule("metadata.labels.app", Requirement::Required, Some("identity")),
        ];
        let path = FieldPath::root().child("metadata").child("labels").child("app");
        let (severity, group) = expected_disposition(&rules, &path);
        assert_eq!(severity, Severity::Blocking);
        assert_eq!(group.as_deref(), Some("identity"));

        let other = FieldPath::root().child("metadata").child("labels").child("tier");
        assert_eq!(expected_disposition(&rules, &other).0, Severity::Advisory);
    }

    #[test]
    fn unruled_paths_default_to_blocking() {
        let path = FieldPath::root().child("spec").child("replicas");
        assert_eq!(expected_disposition(&[], &path).0, Severity::Blocking);
    }

    #[test]
    fn forbidden_extras_are_blocking() {
        let rules = vec![rule("flags.force", Requirement::Forbidden, None)];
        let path = FieldPath::root().child("flags").child("force");
        let (kind, severity, _) = extra_disposition(&rules, &path);
        assert_eq!(kind, DiscrepancyKind::Forbidden);
        assert_eq!(severity, Severity::Blocking);
    }
}

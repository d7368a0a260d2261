//! kubedrill-eval: expectation matcher and feedback composer.
//!
//! Consumes a normalized submission and the pre-validated acceptance
//! criteria of one exercise step, and produces a [`MatchResult`]: a
//! structural diff folded into a verdict and a score. Evaluation is fully
//! deterministic -- `BTreeMap` iteration everywhere, no randomness, no
//! clocks, no I/O -- so identical inputs always grade identically.

pub mod command_match;
pub mod diff;
pub mod feedback;
pub mod rules;
pub mod score;
pub mod types;

pub use feedback::{compose, DEFAULT_MAX_FEEDBACK};
pub use score::{ADVISORY_WEIGHT, BLOCKING_WEIGHT};
pub use types::{DiscrepancyKind, FieldDiscrepancy, MatchResult, Severity, Verdict};

use kubedrill_core::{Budget, CommandIntent, DeadlineExceeded, FieldPath, NormalizedSpec};
use kubedrill_exercise::{AcceptanceCriterion, Expected};

/// A parsed learner submission, ready for matching.
#[derive(Debug, Clone)]
pub enum Submitted {
    Manifest(NormalizedSpec),
    Command(CommandIntent),
}

/// Grade a submission against every candidate criterion and return the
/// best match. Candidates are ranked by verdict, then score; ties prefer
/// the first-authored criterion so grading is reproducible.
pub fn evaluate(
    budget: &Budget,
    submitted: &Submitted,
    criteria: &[AcceptanceCriterion],
) -> Result<MatchResult, DeadlineExceeded> {
    let mut best: Option<MatchResult> = None;

    for criterion in criteria {
        let candidate = match (submitted, &criterion.expected) {
            (Submitted::Manifest(spec), Expected::Manifest(expected)) => {
                let diffs = diff::diff_manifest(budget, spec, expected, &criterion.rules)?;
                score::assess(
                    &criterion.id,
                    diff::leaf_count(&expected.root),
                    diffs,
                    &criterion.rules,
                )
            }
            (Submitted::Command(intent), Expected::Command(expected)) => {
                let diffs = command_match::diff_command(budget, intent, expected, &criterion.rules)?;
                score::assess(
                    &criterion.id,
                    command_match::intent_leaf_count(expected),
                    diffs,
                    &criterion.rules,
                )
            }
            _ => continue,
        };

        let better = match &best {
            None => true,
            Some(current) => {
                (candidate.verdict.rank(), candidate.score)
                    > (current.verdict.rank(), current.score)
            }
        };
        if better {
            best = Some(candidate);
        }
    }

    Ok(best.unwrap_or_else(mode_mismatch))
}

/// No criterion matched the submission's mode. Unreachable through the
/// runner (definitions are validated at load), handled totally anyway.
fn mode_mismatch() -> MatchResult {
    MatchResult {
        verdict: Verdict::Fail,
        score: 0.0,
        discrepancies: vec![FieldDiscrepancy {
            path: FieldPath::root(),
            kind: DiscrepancyKind::TypeMismatch,
            severity: Severity::Blocking,
            expected_shape: None,
            expected_value: None,
            actual: None,
            group: None,
        }],
        criterion_id: String::new(),
    }
}

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod integration_tests {
    use super::*;
    use kubedrill_core::{normalize, parse_command};
    use kubedrill_exercise::parse_yaml_definitions;

    fn step_criteria(src: &str) -> Vec<AcceptanceCriterion> {
        let defs = parse_yaml_definitions(src).unwrap();
        defs.into_iter().next().unwrap().steps.remove(0).criteria
    }

    const DEPLOY_EXERCISE: &str = "\
id: deploy-basic
kind: manifest
criteria:
  - id: main
    manifest: |
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

    /// Exact pass: matching submission grades pass with score 1 and no
    /// discrepancies.
    #[test]
    fn exact_pass_scores_one() {
        let criteria = step_criteria(DEPLOY_EXERCISE);
        let submitted = Submitted::Manifest(
            normalize(
                "\
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
",
            )
            .unwrap(),
        );
        let result = evaluate(&Budget::unlimited(), &submitted, &criteria).unwrap();
        assert_eq!(result.verdict, Verdict::Pass);
        assert_eq!(result.score, 1.0);
        assert!(result.discrepancies.is_empty());
    }

    /// Missing replicas (which has no default) fails and names the path.
    #[test]
    fn missing_replicas_fails_with_the_path() {
        let criteria = step_criteria(DEPLOY_EXERCISE);
        let submitted = Submitted::Manifest(
            normalize(
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
            .unwrap(),
        );
        let result = evaluate(&Budget::unlimited(), &submitted, &criteria).unwrap();
        assert_eq!(result.verdict, Verdict::Fail);
        assert!(result
            .discrepancies
            .iter()
            .any(|d| d.path.to_string() == "spec.replicas"));
    }

    /// Alternative acceptance: either Service type passes, graded against
    /// the criterion it matched.
    #[test]
    fn alternative_service_types_both_pass() {
        let src = "\
id: expose-web
kind: manifest
criteria:
  - id: nodeport
    manifest: |
      apiVersion: v1
      kind: Service
      metadata:
        name: web
      spec:
        type: NodePort
        ports:
          - port: 80
  - id: loadbalancer
    manifest: |
      apiVersion: v1
      kind: Service
      metadata:
        name: web
      spec:
        type: LoadBalancer
        ports:
          - port: 80
";
        let criteria = step_criteria(src);
        let submitted = Submitted::Manifest(
            normalize(
                "\
apiVersion: v1
kind: Service
metadata:
  name: web
spec:
  type: LoadBalancer
  ports:
    - port: 80
",
            )
            .unwrap(),
        );
        let result = evaluate(&Budget::unlimited(), &submitted, &criteria).unwrap();
        assert_eq!(result.verdict, Verdict::Pass);
        assert_eq!(result.criterion_id, "loadbalancer");
    }

    /// Ties between equally scored candidates go to the first-authored.
    #[test]
    fn ties_prefer_the_first_authored_criterion() {
        let src = "\
id: two-answers
kind: command
criteria:
  - id: first
    command: kubectl get pods
  - id: second
    command: kubectl get pods
";
        let criteria = step_criteria(src);
        let submitted = Submitted::Command(parse_command("kubectl get pods").unwrap());
        let result = evaluate(&Budget::unlimited(), &submitted, &criteria).unwrap();
        assert_eq!(result.criterion_id, "first");
    }

    /// Command exercise with an optional extra flag still passes.
    #[test]
    fn optional_grace_period_still_passes() {
        let src = "\
id: delete-pod
kind: command
criteria:
  - id: main
    command: kubectl delete pod nginx
    rules:
      - path: flags.grace-period
        require: optional
";
        let criteria = step_criteria(src);
        let submitted =
            Submitted::Command(parse_command("kubectl delete pod nginx --grace-period=0").unwrap());
        let result = evaluate(&Budget::unlimited(), &submitted, &criteria).unwrap();
        assert_eq!(result.verdict, Verdict::Pass);
        assert!(result.score < 1.0);
    }

    /// The quoting gotcha: a float where the schema wants a string is a
    /// blocking type mismatch even when the rendering looks right.
    #[test]
    fn quoting_gotcha_blocks_the_pass() {
        let src = "\
id: env-version
kind: manifest
criteria:
  - id: main
    manifest: |
      apiVersion: v1
      kind: Pod
      metadata:
        name: web
      spec:
        containers:
          - name: app
            image: nginx:1.25
            env:
              - name: APP_VERSION
                value: \"1.10\"
";
        let criteria = step_criteria(src);
        let submitted = Submitted::Manifest(
            normalize(
                "\
apiVersion: v1
kind: Pod
metadata:
  name: web
spec:
  containers:
    - name: app
      image: nginx:1.25
      env:
        - name: APP_VERSION
          value: 1.10
",
            )
            .unwrap(),
        );
        let result = evaluate(&Budget::unlimited(), &submitted, &criteria).unwrap();
        assert_eq!(result.verdict, Verdict::Fail);
        let mismatch = result
            .discrepancies
            .iter()
            .find(|d| d.kind == DiscrepancyKind::TypeMismatch)
            .unwrap();
        assert!(mismatch.path.to_string().ends_with("env[0].value"));
        assert_eq!(mismatch.severity, Severity::Blocking);
    }

    /// Determinism: the same inputs grade identically, twice.
    #[test]
    fn evaluation_is_deterministic() {
        let criteria = step_criteria(DEPLOY_EXERCISE);
        let submitted = Submitted::Manifest(
            normalize(
                "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  replicas: 2
  template:
    spec:
      containers:
        - name: app
          image: nginx:1.24
",
            )
            .unwrap(),
        );
        let first = evaluate(&Budget::unlimited(), &submitted, &criteria).unwrap();
        let second = evaluate(&Budget::unlimited(), &submitted, &criteria).unwrap();
        assert_eq!(first.verdict, second.verdict);
        assert_eq!(first.score, second.score);
        assert_eq!(first.discrepancies.len(), second.discrepancies.len());
        for (a, b) in first.discrepancies.iter().zip(&second.discrepancies) {
            assert_eq!(a.path, b.path);
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.severity, b.severity);
        }
    }

    /// Monotonicity: supplying a previously missing required field can
    /// only improve the score.
    #[test]
    fn adding_a_missing_field_improves_the_score() {
        let criteria = step_criteria(DEPLOY_EXERCISE);
        let without = Submitted::Manifest(
            normalize(
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
            .unwrap(),
        );
        let with = Submitted::Manifest(
            normalize(
                "\
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
",
            )
            .unwrap(),
        );
        let before = evaluate(&Budget::unlimited(), &without, &criteria).unwrap();
        let after = evaluate(&Budget::unlimited(), &with, &criteria).unwrap();
        assert!(after.score > before.score);
        assert_eq!(after.verdict, Verdict::Pass);
    }
}

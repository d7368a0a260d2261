//! Validates grader output against the published GradeResponse JSON
//! Schema at docs/grade-response-schema.json.

use kubedrill_runner::Grader;
use std::path::Path;

const DEFINITIONS: &str = "\
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
---
id: delete-pod
kind: command
criteria:
  - id: main
    command: kubectl delete pod nginx
";

fn schema_validator() -> jsonschema::Validator {
    let schema_path =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../docs/grade-response-schema.json");
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("failed to compile schema: {}", e))
}

#[test]
fn all_grading_outcomes_validate_against_the_schema() {
    let validator = schema_validator();
    let grader = Grader::from_yaml(DEFINITIONS).unwrap();

    let submissions = [
        // pass
        (
            "deploy-basic",
            "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\nspec:\n  replicas: 3\n  template:\n    spec:\n      containers:\n        - name: app\n          image: nginx:1.25\n",
        ),
        // fail with feedback
        (
            "deploy-basic",
            "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\nspec:\n  template:\n    spec:\n      containers:\n        - name: app\n          image: nginx:1.25\n",
        ),
        // parse failure
        ("deploy-basic", "kind: [unclosed"),
        // command pass
        ("delete-pod", "kubectl delete po nginx"),
        // command with unsupported syntax
        ("delete-pod", "kubectl delete pod nginx | tee log"),
    ];

    for (exercise, raw) in submissions {
        let response = grader.grade(exercise, raw).unwrap();
        let json = response.to_json();
        if let Err(error) = validator.validate(&json) {
            panic!("response for {} failed schema validation: {}", exercise, error);
        }
        let via_serde = serde_json::to_value(&response).unwrap();
        assert_eq!(via_serde, json, "serde and to_json must agree for {}", exercise);
    }
}

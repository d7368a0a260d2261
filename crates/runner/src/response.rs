//! The wire format returned to the exercise widget.

use kubedrill_eval::Verdict;
use serde::Serialize;

/// One graded submission, serialized as
/// `{ "verdict": "pass"|"fail"|"partial", "score": number, "feedback": [string] }`.
/// The shape is pinned by `docs/grade-response-schema.json`.
#[derive(Debug, Clone, Serialize)]
pub struct GradeResponse {
    pub verdict: Verdict,
    pub score: f64,
    pub feedback: Vec<String>,
}

impl GradeResponse {
    /// Serialize to the published JSON shape.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "feedback": self.feedback,
            "score": self.score,
            "verdict": self.verdict.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape_is_stable() {
        let response = GradeResponse {
            verdict: Verdict::Partial,
            score: 0.75,
            feedback: vec!["check the spec.replicas field".to_string()],
        };
        let json = response.to_json();
        assert_eq!(json["verdict"], "partial");
        assert_eq!(json["score"], 0.75);
        assert_eq!(json["feedback"][0], "check the spec.replicas field");
    }

    #[test]
    fn serde_and_to_json_agree() {
        let response = GradeResponse {
            verdict: Verdict::Pass,
            score: 1.0,
            feedback: Vec::new(),
        };
        let via_serde = serde_json::to_value(&response).unwrap();
        assert_eq!(via_serde, response.to_json());
    }
}
